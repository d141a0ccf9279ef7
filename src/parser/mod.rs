//! Recursive-descent parser.
//!
//! One procedure per nonterminal, one token of effective lookahead plus a
//! bounded scan for the declaration/statement ambiguity. The parser never
//! resolves names: every identifier-use site keeps only its path.
//!
//! Failure policy: a syntax error is reported at the offending location, one
//! token is skipped, and parsing continues. Parsing always completes and
//! returns a (possibly partially-populated) module.

mod decl;
mod expr;
mod stmt;

#[cfg(test)]
mod tests;

pub use decl::DeclParsing;
pub use expr::ExprParsing;
pub use stmt::StmtParsing;

use crate::ast::builder::AstBuilder;
use crate::ast::decl::{ScopeSet, Var, Visibility};
use crate::ast::module::Module;
use crate::diag::{DiagKind, Diagnostic, Diags};
use crate::intern::{Interner, Symbol};
use crate::source::Span;
use crate::token::{Token, TokenKind};

pub(crate) type ParseResult<T> = Result<T, Diagnostic>;

pub struct Parser<'a, 'b, 'd> {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) builder: &'b mut AstBuilder<'a>,
    pub(super) interner: &'b Interner,
    pub(super) diags: &'b mut Diags<'d>,
    pub(super) module: Module<'a>,
    /// Flat locals of the function body being parsed.
    pub(super) locals: Vec<&'a Var<'a>>,
    /// Name of the class whose body is being parsed, for constructor
    /// detection.
    pub(super) class_name: Option<Symbol>,
}

impl<'a, 'b, 'd> Parser<'a, 'b, 'd> {
    pub fn new(
        tokens: Vec<Token>,
        builder: &'b mut AstBuilder<'a>,
        interner: &'b Interner,
        diags: &'b mut Diags<'d>,
        module: Module<'a>,
    ) -> Self {
        Parser {
            tokens,
            current: 0,
            builder,
            interner,
            diags,
            module,
            locals: Vec::new(),
            class_name: None,
        }
    }

    // ----- token plumbing ---------------------------------------------------

    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(super) fn peek_kind_at(&self, offset: usize) -> &TokenKind {
        let i = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[i].kind
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub(super) fn check_ident(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident(_))
    }

    pub(super) fn at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_error(&kind.describe(self.interner)))
        }
    }

    /// Consume the next identifier token, returning its symbol and span.
    pub(super) fn ident(&mut self) -> ParseResult<(Symbol, Span)> {
        match self.peek().kind {
            TokenKind::Ident(sym) => {
                let span = self.current_span();
                self.advance();
                Ok((sym, span))
            }
            _ => Err(self.syntax_error("identifier")),
        }
    }

    pub(super) fn syntax_error(&self, expected: &str) -> Diagnostic {
        Diagnostic::new(
            self.current_span(),
            DiagKind::Syntax {
                expected: expected.to_string(),
                found: self.peek().kind.describe(self.interner),
            },
        )
    }

    // ----- module-level grammar ---------------------------------------------

    /// Drives the whole module and always returns one, however broken the
    /// input was.
    pub fn parse_module(mut self) -> Module<'a> {
        self.parse_namespace();
        self.parse_imports();

        if self.at_end() && self.module.definitions.is_empty() {
            self.diags.report(self.current_span(), DiagKind::EmptyModule);
        }

        while !self.at_end() {
            if let Err(diag) = self.parse_top_def() {
                self.diags.report(diag.span, diag.kind);
                self.advance();
            }
        }

        // A trailing comment belongs to no declaration; keep it as a
        // free-standing definition.
        if let Some(text) = self.peek().comment {
            let span = self.current_span();
            self.builder.add_comment(&mut self.module, text, span);
        }

        self.module
    }

    fn parse_namespace(&mut self) {
        if !self.check(&TokenKind::Namespace) {
            // No header: the module joins the implicit default namespace.
            self.module.namespace = self.builder.default_namespace();
            return;
        }
        self.advance();
        match self.peek().kind {
            TokenKind::Ident(sym) => {
                self.advance();
                self.module.namespace = sym;
            }
            TokenKind::Default => {
                self.advance();
                self.module.namespace = self.builder.default_namespace();
            }
            _ => {
                let diag = self.syntax_error("namespace name");
                self.diags.report(diag.span, diag.kind);
                self.module.namespace = self.builder.default_namespace();
            }
        }
    }

    fn parse_imports(&mut self) {
        while self.check(&TokenKind::Import) {
            if let Err(diag) = self.parse_import() {
                self.diags.report(diag.span, diag.kind);
                self.advance();
            }
        }
        // A second namespace header is invalid; report it, skip it whole
        // (keeping the first declaration), and continue.
        if self.check(&TokenKind::Namespace) {
            let diag = self.syntax_error("top-level definition");
            self.diags.report(diag.span, diag.kind);
            self.advance();
            if matches!(self.peek().kind, TokenKind::Ident(_) | TokenKind::Default) {
                self.advance();
            }
            self.parse_imports();
        }
    }

    fn parse_import(&mut self) -> ParseResult<()> {
        let comment = self.peek().comment;
        let kw = self.advance();

        if self.eat(&TokenKind::LParen) {
            // import ( "a", "b" as "c" )
            loop {
                self.parse_import_entry(kw.span, comment)?;
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            return Ok(());
        }

        self.parse_import_entry(kw.span, comment)
    }

    fn parse_import_entry(&mut self, kw_span: Span, comment: Option<Symbol>) -> ParseResult<()> {
        let (name, name_span) = self.import_name()?;
        let (alias, alias_span) = if self.eat(&TokenKind::As) {
            let (alias, span) = self.import_name()?;
            (Some(alias), Some(span))
        } else {
            (None, None)
        };
        let import = self.builder.create_import(
            kw_span.to(alias_span.unwrap_or(name_span)),
            name,
            name_span,
            alias,
            alias_span,
            comment,
        );
        self.builder.add_import(&mut self.module, import);
        Ok(())
    }

    /// Import targets are written as string literals.
    fn import_name(&mut self) -> ParseResult<(Symbol, Span)> {
        match self.peek().kind {
            TokenKind::StringLit(sym) if sym != Symbol::EMPTY => {
                let span = self.current_span();
                self.advance();
                Ok((sym, span))
            }
            TokenKind::StringLit(_) => Err(self.syntax_error("namespace name")),
            _ => Err(self.syntax_error("namespace name string")),
        }
    }

    fn parse_top_def(&mut self) -> ParseResult<()> {
        let comment = self.peek().comment;
        let scopes = self.parse_scopes()?;

        match self.peek().kind {
            TokenKind::Class | TokenKind::Struct | TokenKind::Interface => {
                self.parse_class(scopes, comment)
            }
            TokenKind::Enum => self.parse_enum(scopes, comment),
            _ => self.parse_var_or_function(scopes, comment),
        }
    }

    /// Greedy unordered scope prefix; at most one visibility keyword.
    pub(super) fn parse_scopes(&mut self) -> ParseResult<ScopeSet> {
        let mut scopes = ScopeSet::default();
        loop {
            let visibility = match self.peek().kind {
                TokenKind::Public => Some(Visibility::Public),
                TokenKind::Private => Some(Visibility::Private),
                TokenKind::Protected => Some(Visibility::Protected),
                TokenKind::Const => {
                    self.advance();
                    scopes.constant = true;
                    continue;
                }
                _ => None,
            };
            match visibility {
                Some(v) => {
                    if scopes.visibility != Visibility::Default {
                        return Err(self.syntax_error("at most one visibility keyword"));
                    }
                    self.advance();
                    scopes.visibility = v;
                }
                None => break,
            }
        }
        Ok(scopes)
    }
}
