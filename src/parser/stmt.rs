//! Statement parsing.
//!
//! Statements are delimited structurally, not by newlines; a semicolon is
//! accepted as an optional separator. The declaration/statement ambiguity
//! (`Point p` vs `p = 1`) is settled by a bounded token scan, never by
//! resolving names.

use super::{DeclParsing, ExprParsing, ParseResult, Parser};
use crate::ast::decl::ScopeSet;
use crate::ast::expr::{BinaryOp, UnaryOp};
use crate::ast::stmt::{Block, Elsif, Stmt, SwitchCase};
use crate::ast::types::TypeRefKind;
use crate::intern::Symbol;
use crate::source::Span;
use crate::token::TokenKind;

pub trait StmtParsing<'a> {
    fn parse_block(&mut self) -> ParseResult<&'a Block<'a>>;
    fn parse_stmt(&mut self) -> ParseResult<&'a Stmt<'a>>;
    fn parse_stmt_or_block(&mut self) -> ParseResult<&'a Stmt<'a>>;
}

impl<'a, 'b, 'd> StmtParsing<'a> for Parser<'a, 'b, 'd> {
    fn parse_block(&mut self) -> ParseResult<&'a Block<'a>> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(diag) => {
                    self.diags.report(diag.span, diag.kind);
                    self.advance();
                }
            }
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(self.builder.block(open.span.to(close.span), stmts))
    }

    fn parse_stmt(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kind = self.peek().kind.clone();
        match kind {
            TokenKind::Return => self.parse_return(),
            TokenKind::Fail => self.parse_fail(),
            TokenKind::Break => {
                let token = self.advance();
                Ok(self.builder.break_stmt(token.span))
            }
            TokenKind::Continue => {
                let token = self.advance();
                Ok(self.builder.continue_stmt(token.span))
            }
            TokenKind::Delete => self.parse_delete(),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Handle => self.parse_handle(None),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(self.builder.block_stmt(block))
            }
            TokenKind::TyBool
            | TokenKind::TyChar
            | TokenKind::TyString
            | TokenKind::TyVoid
            | TokenKind::TyError
            | TokenKind::TyInt(_)
            | TokenKind::TyFloat(_) => self.parse_var_decl(),
            TokenKind::Ident(_) => {
                if self.is_var_decl_start() {
                    self.parse_var_decl()
                } else {
                    self.parse_simple_stmt()
                }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => self.parse_simple_stmt(),
            _ => Err(self.syntax_error("statement")),
        }
    }

    /// Body position of a control-flow statement: single statement or
    /// braced block.
    fn parse_stmt_or_block(&mut self) -> ParseResult<&'a Stmt<'a>> {
        if self.check(&TokenKind::LBrace) {
            let block = self.parse_block()?;
            Ok(self.builder.block_stmt(block))
        } else {
            self.parse_stmt()
        }
    }
}

impl<'a, 'b, 'd> Parser<'a, 'b, 'd> {
    /// `type name (= expr)?`, or the binding form `error e = handle { .. }`.
    fn parse_var_decl(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.current_span();
        let ty = self.parse_type_ref()?;
        let (name, name_span) = self.ident()?;

        if matches!(ty.kind, TypeRefKind::Error)
            && self.check(&TokenKind::Assign)
            && matches!(self.peek_kind_at(1), TokenKind::Handle)
        {
            self.advance(); // consume '='
            return self.parse_handle(Some((name, name_span)));
        }

        let init = if self.eat(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let var = self
            .builder
            .create_local(name_span, ty, name, ScopeSet::default(), init);
        self.locals.push(var);
        let end = init.map(|e| e.span).unwrap_or(name_span);
        Ok(self.builder.var_decl_stmt(start.to(end), var))
    }

    /// Assignment, call, or increment/decrement; the statement forms that
    /// begin with an identifier path.
    fn parse_simple_stmt(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let start = self.current_span();

        // Prefix increment/decrement as a statement: `++i`.
        let prefix = match self.peek().kind {
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = prefix {
            self.advance();
            let path = self.parse_path()?;
            let target = self.builder.var_ref(path);
            let operand = self.builder.var_ref_expr(path.span, target);
            let expr = self.builder.unary_expr(start.to(path.span), op, operand);
            return Ok(self.builder.expr_stmt(expr.span, expr));
        }

        let path = self.parse_path()?;

        if self.peek().kind.is_assign_op() {
            let op_token = self.advance();
            let rhs = self.parse_expr()?;
            let target = self.builder.var_ref(path);
            // `a op= b` desugars to `a = a op b`.
            let value = match assign_binary_op(&op_token.kind) {
                None => rhs,
                Some(op) => {
                    let read = self.builder.var_ref(path);
                    let read_expr = self.builder.var_ref_expr(path.span, read);
                    self.builder
                        .binary_expr(path.span.to(rhs.span), op, read_expr, rhs)
                }
            };
            return Ok(self.builder.assign_stmt(start.to(rhs.span), target, value));
        }

        if self.check(&TokenKind::LParen) {
            let (args, end) = self.parse_call_args()?;
            let call = self.builder.call(path, args, false);
            let expr = self.builder.call_expr(start.to(end), call);
            return Ok(self.builder.expr_stmt(expr.span, expr));
        }

        // Element increment/decrement: `xs[i]++`.
        let target = self.builder.var_ref(path);
        let mut operand = self.builder.var_ref_expr(path.span, target);
        while self.check(&TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expr()?;
            let close = self.expect(TokenKind::RBracket)?;
            operand = self
                .builder
                .index_expr(operand.span.to(close.span), operand, index);
        }

        let postfix = match self.peek().kind {
            TokenKind::PlusPlus => Some(UnaryOp::PostInc),
            TokenKind::MinusMinus => Some(UnaryOp::PostDec),
            _ => None,
        };
        if let Some(op) = postfix {
            let op_token = self.advance();
            let expr = self
                .builder
                .unary_expr(start.to(op_token.span), op, operand);
            return Ok(self.builder.expr_stmt(expr.span, expr));
        }

        Err(self.syntax_error("statement"))
    }

    fn parse_return(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();
        let value = if self.value_expr_follows() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = value.map(|e| e.span).unwrap_or(kw.span);
        Ok(self.builder.return_stmt(kw.span.to(end), value))
    }

    fn parse_fail(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();
        let payload = if self.value_expr_follows() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = payload.map(|e| e.span).unwrap_or(kw.span);
        Ok(self.builder.fail_stmt(kw.span.to(end), payload))
    }

    fn parse_delete(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();
        let path = self.parse_path()?;
        let target = self.builder.var_ref(path);
        Ok(self.builder.delete_stmt(kw.span.to(path.span), target))
    }

    fn parse_if(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();
        let cond = self.parse_expr()?;
        let then_stmt = self.parse_stmt_or_block()?;

        let mut elsifs = Vec::new();
        while self.check(&TokenKind::Elsif) {
            self.advance();
            let elsif_cond = self.parse_expr()?;
            let elsif_stmt = self.parse_stmt_or_block()?;
            elsifs.push(Elsif {
                cond: elsif_cond,
                stmt: elsif_stmt,
            });
        }

        let else_stmt = if self.eat(&TokenKind::Else) {
            Some(self.parse_stmt_or_block()?)
        } else {
            None
        };

        Ok(self
            .builder
            .if_stmt(kw.span, cond, then_stmt, elsifs, else_stmt))
    }

    fn parse_while(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();
        let cond = self.parse_expr()?;
        let body = self.parse_stmt_or_block()?;
        Ok(self
            .builder
            .loop_stmt(kw.span, None, Some(cond), None, body))
    }

    /// `for init* ; cond? ; post* body`. Init and post are comma-separated
    /// statement lists wrapped in implicit blocks; `for ; cond ;` is legal.
    fn parse_for(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();

        let init_span = self.current_span();
        let mut init_stmts = Vec::new();
        if !self.check(&TokenKind::Semicolon) {
            loop {
                init_stmts.push(self.parse_for_clause_stmt()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Semicolon)?;

        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let post_span = self.current_span();
        let mut post_stmts = Vec::new();
        while self.clause_stmt_follows() {
            post_stmts.push(self.parse_for_clause_stmt()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let init = self.builder.block(init_span, init_stmts);
        let post = self.builder.block(post_span, post_stmts);
        let body = self.parse_stmt_or_block()?;
        Ok(self
            .builder
            .loop_stmt(kw.span, Some(init), cond, Some(post), body))
    }

    fn parse_for_clause_stmt(&mut self) -> ParseResult<&'a Stmt<'a>> {
        if self.peek().kind.is_type_keyword() || self.is_var_decl_start() {
            self.parse_var_decl()
        } else {
            self.parse_simple_stmt()
        }
    }

    /// Could the next tokens form a for-clause statement (rather than the
    /// loop body)?
    fn clause_stmt_follows(&self) -> bool {
        match self.peek().kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::Ident(_) => true,
            ref kind => kind.is_type_keyword(),
        }
    }

    fn parse_switch(&mut self) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.advance();
        let scrutinee = self.parse_expr()?;
        self.expect(TokenKind::LBrace)?;

        let mut cases: Vec<SwitchCase<'a>> = Vec::new();
        let mut default: Option<&'a Block<'a>> = None;
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.check(&TokenKind::Case) {
                let case_kw = self.advance();
                let value = self.parse_expr()?;
                self.expect(TokenKind::Colon)?;
                let block = self.parse_case_block()?;
                cases.push(SwitchCase {
                    span: case_kw.span.to(value.span),
                    value,
                    block,
                });
            } else if self.check(&TokenKind::Default) {
                let default_kw = self.advance();
                self.expect(TokenKind::Colon)?;
                let block = self.parse_case_block()?;
                if default.is_some() {
                    self.diags.report(
                        default_kw.span,
                        crate::diag::DiagKind::DuplicateDecl {
                            name: "default".to_string(),
                        },
                    );
                }
                default = Some(block);
            } else {
                let diag = self.syntax_error("`case` or `default`");
                self.diags.report(diag.span, diag.kind);
                self.advance();
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.builder.switch_stmt(kw.span, scrutinee, cases, default))
    }

    /// Statements of one case arm, up to the next label or closing brace.
    /// Empty means fall-through.
    fn parse_case_block(&mut self) -> ParseResult<&'a Block<'a>> {
        let span = self.current_span();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Case)
            && !self.check(&TokenKind::Default)
            && !self.check(&TokenKind::RBrace)
            && !self.at_end()
        {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(diag) => {
                    self.diags.report(diag.span, diag.kind);
                    self.advance();
                }
            }
        }
        Ok(self.builder.block(span, stmts))
    }

    /// `handle { .. }`, with `binding` set for the `error e = handle` form.
    pub(super) fn parse_handle(
        &mut self,
        binding: Option<(Symbol, Span)>,
    ) -> ParseResult<&'a Stmt<'a>> {
        let kw = self.expect(TokenKind::Handle)?;
        let var_span = binding.map(|(_, span)| span).unwrap_or(kw.span);
        let error_var = self
            .builder
            .create_handle_error_var(var_span, binding.map(|(name, _)| name));
        self.locals.push(error_var);
        let block = self.parse_block()?;
        Ok(self
            .builder
            .handle_stmt(kw.span.to(block.span), error_var, block))
    }

    /// Does an expression follow here, as opposed to the next statement?
    /// Used by `return` and `fail`, whose argument is optional.
    fn value_expr_follows(&self) -> bool {
        match self.peek().kind {
            TokenKind::IntLit { .. }
            | TokenKind::FloatLit(_)
            | TokenKind::CharLit(_)
            | TokenKind::StringLit(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::LParen
            | TokenKind::Bang
            | TokenKind::Minus
            | TokenKind::New => true,
            TokenKind::Ident(_) => {
                // `return` followed by `x = 1` is a bare return and an
                // assignment statement; peek past the path to tell.
                let mut i = self.current + 1;
                loop {
                    let dot = matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::Dot));
                    let ident = matches!(
                        self.tokens.get(i + 1).map(|t| &t.kind),
                        Some(TokenKind::Ident(_))
                    );
                    if dot && ident {
                        i += 2;
                    } else {
                        break;
                    }
                }
                !matches!(
                    self.tokens.get(i).map(|t| t.kind.is_assign_op()),
                    Some(true)
                )
            }
            _ => false,
        }
    }

    /// Bounded scan deciding declaration vs statement for an identifier
    /// head: a path, optional bracket groups, then another identifier is a
    /// declaration.
    pub(super) fn is_var_decl_start(&self) -> bool {
        let kind_at = |i: usize| self.tokens.get(i).map(|t| &t.kind);
        let mut i = self.current;

        if !matches!(kind_at(i), Some(TokenKind::Ident(_))) {
            return false;
        }
        i += 1;
        while matches!(kind_at(i), Some(TokenKind::Dot))
            && matches!(kind_at(i + 1), Some(TokenKind::Ident(_)))
        {
            i += 2;
        }
        while matches!(kind_at(i), Some(TokenKind::LBracket)) {
            let mut depth = 1usize;
            i += 1;
            while depth > 0 {
                match kind_at(i) {
                    Some(TokenKind::LBracket) => depth += 1,
                    Some(TokenKind::RBracket) => depth -= 1,
                    Some(TokenKind::Eof) | None => return false,
                    _ => {}
                }
                i += 1;
            }
        }
        matches!(kind_at(i), Some(TokenKind::Ident(_)))
    }
}

fn assign_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Assign => None,
        TokenKind::PlusAssign => Some(BinaryOp::Add),
        TokenKind::MinusAssign => Some(BinaryOp::Sub),
        TokenKind::StarAssign => Some(BinaryOp::Mul),
        TokenKind::SlashAssign => Some(BinaryOp::Div),
        TokenKind::PercentAssign => Some(BinaryOp::Rem),
        TokenKind::AmpAssign => Some(BinaryOp::BitAnd),
        TokenKind::PipeAssign => Some(BinaryOp::BitOr),
        TokenKind::CaretAssign => Some(BinaryOp::BitXor),
        TokenKind::ShlAssign => Some(BinaryOp::Shl),
        TokenKind::ShrAssign => Some(BinaryOp::Shr),
        _ => None,
    }
}
