//! Top-level and member declarations: global vars, functions, classes,
//! enums, and type references.

use super::{ExprParsing, ParseResult, Parser, StmtParsing};
use crate::ast::decl::{ClassKind, Function, FunctionKind, ScopeSet, Var};
use crate::ast::expr::Path;
use crate::ast::types::{TypeRef, TypeRefKind};
use crate::intern::Symbol;
use crate::source::Span;
use crate::token::TokenKind;

pub trait DeclParsing<'a> {
    fn parse_var_or_function(
        &mut self,
        scopes: ScopeSet,
        comment: Option<Symbol>,
    ) -> ParseResult<()>;
    fn parse_class(&mut self, scopes: ScopeSet, comment: Option<Symbol>) -> ParseResult<()>;
    fn parse_enum(&mut self, scopes: ScopeSet, comment: Option<Symbol>) -> ParseResult<()>;
    fn parse_type_ref(&mut self) -> ParseResult<&'a TypeRef<'a>>;
    fn parse_type_path(&mut self) -> ParseResult<Path<'a>>;
    fn parse_params(&mut self) -> ParseResult<Vec<&'a Var<'a>>>;
    fn parse_function_tail(
        &mut self,
        return_type: &'a TypeRef<'a>,
        name: Symbol,
        name_span: Span,
        scopes: ScopeSet,
        kind: FunctionKind,
        comment: Option<Symbol>,
    ) -> ParseResult<&'a Function<'a>>;
}

impl<'a, 'b, 'd> DeclParsing<'a> for Parser<'a, 'b, 'd> {
    /// `type ident` followed by `(` is a function, anything else a global.
    fn parse_var_or_function(
        &mut self,
        scopes: ScopeSet,
        comment: Option<Symbol>,
    ) -> ParseResult<()> {
        let ty = self.parse_type_ref()?;
        let (name, name_span) = self.ident()?;

        if self.check(&TokenKind::LParen) {
            let function =
                self.parse_function_tail(ty, name, name_span, scopes, FunctionKind::Free, comment)?;
            self.builder.add_function(&mut self.module, function);
            return Ok(());
        }

        let init = if self.eat(&TokenKind::Assign) {
            // A broken initializer still leaves a declared global behind,
            // so later references resolve and report once.
            match self.parse_expr() {
                Ok(expr) => Some(expr),
                Err(diag) => {
                    self.diags.report(diag.span, diag.kind);
                    None
                }
            }
        } else {
            None
        };
        let var = self
            .builder
            .create_global_var(name_span, ty, name, scopes, init, comment);
        self.builder.add_global_var(&mut self.module, var);
        Ok(())
    }

    fn parse_class(&mut self, scopes: ScopeSet, comment: Option<Symbol>) -> ParseResult<()> {
        let kw = self.advance();
        let kind = match kw.kind {
            TokenKind::Class => ClassKind::Class,
            TokenKind::Struct => ClassKind::Struct,
            TokenKind::Interface => ClassKind::Interface,
            _ => unreachable!("caller checked the class keyword"),
        };
        let (name, name_span) = self.ident()?;
        let super_types = self.parse_super_list()?;

        self.expect(TokenKind::LBrace)?;
        let previous_class = self.class_name.replace(name);

        let mut attributes = Vec::new();
        let mut methods = Vec::new();
        let mut constructors = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if let Err(diag) =
                self.parse_member(name, kind, &mut attributes, &mut methods, &mut constructors)
            {
                self.diags.report(diag.span, diag.kind);
                self.advance();
            }
        }

        self.class_name = previous_class;
        self.expect(TokenKind::RBrace)?;

        let class = self.builder.create_class(
            kw.span.to(name_span),
            kind,
            name,
            scopes,
            super_types,
            attributes,
            methods,
            constructors,
            comment,
        );
        self.builder.add_class(&mut self.module, class);
        Ok(())
    }

    fn parse_enum(&mut self, scopes: ScopeSet, comment: Option<Symbol>) -> ParseResult<()> {
        let kw = self.advance();
        let (name, name_span) = self.ident()?;
        let super_types = self.parse_super_list()?;

        self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let entry_comment = self.peek().comment;
            let (entry, entry_span) = self.ident()?;
            entries.push((entry, entry_span, entry_comment));
            self.eat(&TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;

        let enm = self.builder.create_enum(
            kw.span.to(name_span),
            name,
            scopes,
            super_types,
            entries,
            comment,
        );
        self.builder.add_enum(&mut self.module, enm);
        Ok(())
    }

    fn parse_type_ref(&mut self) -> ParseResult<&'a TypeRef<'a>> {
        let span = self.current_span();
        let base = match self.peek().kind {
            TokenKind::TyBool => TypeRefKind::Bool,
            TokenKind::TyChar => TypeRefKind::Char,
            TokenKind::TyString => TypeRefKind::String,
            TokenKind::TyVoid => TypeRefKind::Void,
            TokenKind::TyError => TypeRefKind::Error,
            TokenKind::TyInt(kind) => TypeRefKind::Int(kind),
            TokenKind::TyFloat(kind) => TypeRefKind::Float(kind),
            TokenKind::Ident(_) => {
                let path = self.parse_type_path()?;
                let ty = self
                    .builder
                    .type_ref(path.span, TypeRefKind::Identity(path));
                return self.parse_array_suffix(ty);
            }
            _ => return Err(self.syntax_error("type")),
        };
        self.advance();
        let ty = self.builder.type_ref(span, base);
        self.parse_array_suffix(ty)
    }

    fn parse_type_path(&mut self) -> ParseResult<Path<'a>> {
        // Same dotted-path shape as expression paths; the trailing declared
        // name is never preceded by a dot, so greedy parsing is safe.
        self.parse_path()
    }

    fn parse_params(&mut self) -> ParseResult<Vec<&'a Var<'a>>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let scopes = self.parse_scopes()?;
                let ty = self.parse_type_ref()?;
                let (name, name_span) = self.ident()?;
                let index = params.len() as u32;
                params.push(self.builder.create_param(name_span, ty, name, scopes, index));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    /// Params plus optional body; the signature token (`(`) must be next.
    fn parse_function_tail(
        &mut self,
        return_type: &'a TypeRef<'a>,
        name: Symbol,
        name_span: Span,
        scopes: ScopeSet,
        kind: FunctionKind,
        comment: Option<Symbol>,
    ) -> ParseResult<&'a Function<'a>> {
        let params = self.parse_params()?;
        let function = self.builder.create_function(
            name_span,
            return_type,
            name,
            scopes,
            params,
            kind,
            comment,
        );

        if self.check(&TokenKind::LBrace) {
            let saved = std::mem::take(&mut self.locals);
            match self.parse_block() {
                Ok(body) => {
                    let locals = std::mem::replace(&mut self.locals, saved);
                    self.builder.seal_function(function, body, locals);
                }
                Err(diag) => {
                    self.locals = saved;
                    return Err(diag);
                }
            }
        }
        Ok(function)
    }
}

impl<'a, 'b, 'd> Parser<'a, 'b, 'd> {
    /// `: Super1, Super2` (commas optional) before a class or enum body.
    fn parse_super_list(&mut self) -> ParseResult<Vec<&'a TypeRef<'a>>> {
        let mut supers = Vec::new();
        if self.eat(&TokenKind::Colon) {
            loop {
                let path = self.parse_type_path()?;
                supers.push(
                    self.builder
                        .type_ref(path.span, TypeRefKind::Identity(path)),
                );
                if self.eat(&TokenKind::Comma) || self.check_ident() {
                    continue;
                }
                break;
            }
        }
        Ok(supers)
    }

    fn parse_member(
        &mut self,
        class_name: Symbol,
        class_kind: ClassKind,
        attributes: &mut Vec<&'a Var<'a>>,
        methods: &mut Vec<&'a Function<'a>>,
        constructors: &mut Vec<&'a Function<'a>>,
    ) -> ParseResult<()> {
        let comment = self.peek().comment;
        let scopes = self.parse_scopes()?;

        // Constructor: the class's own name followed by `(`.
        if let TokenKind::Ident(sym) = self.peek().kind {
            if sym == class_name && matches!(self.peek_kind_at(1), TokenKind::LParen) {
                let (name, name_span) = self.ident()?;
                let ret = self.builder.type_ref(name_span, TypeRefKind::Void);
                let ctor = self.parse_function_tail(
                    ret,
                    name,
                    name_span,
                    scopes,
                    FunctionKind::Constructor,
                    comment,
                )?;
                constructors.push(ctor);
                return Ok(());
            }
        }

        let ty = self.parse_type_ref()?;
        let (name, name_span) = self.ident()?;

        if self.check(&TokenKind::LParen) {
            let kind = if class_kind == ClassKind::Interface {
                FunctionKind::Virtual
            } else {
                FunctionKind::Method
            };
            let method = self.parse_function_tail(ty, name, name_span, scopes, kind, comment)?;
            methods.push(method);
        } else {
            let init = if self.eat(&TokenKind::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            attributes.push(
                self.builder
                    .create_attribute(name_span, ty, name, scopes, init, comment),
            );
        }
        Ok(())
    }

    fn parse_array_suffix(&mut self, mut ty: &'a TypeRef<'a>) -> ParseResult<&'a TypeRef<'a>> {
        while self.check(&TokenKind::LBracket) {
            self.advance();
            let size = if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            let rb = self.expect(TokenKind::RBracket)?;
            ty = self.builder.type_ref(
                ty.span.to(rb.span),
                TypeRefKind::Array { elem: ty, size },
            );
        }
        Ok(ty)
    }
}
