//! Expression parsing: precedence climbing over the binary operator table,
//! prefix/postfix unaries, and primaries.
//!
//! Dotted access is parsed as a single identifier path; the parser never
//! guesses whether a segment is a namespace, a variable, or a member. That
//! split is the resolver's job.

use super::{ParseResult, Parser};
use crate::ast::expr::{BinaryOp, Expr, Path, PathSeg, UnaryOp, Value};
use crate::source::Span;
use crate::token::TokenKind;

pub trait ExprParsing<'a> {
    fn parse_expr(&mut self) -> ParseResult<&'a Expr<'a>>;
    fn parse_path(&mut self) -> ParseResult<Path<'a>>;
    fn parse_call_args(&mut self) -> ParseResult<(Vec<&'a Expr<'a>>, Span)>;
}

impl<'a, 'b, 'd> ExprParsing<'a> for Parser<'a, 'b, 'd> {
    fn parse_expr(&mut self) -> ParseResult<&'a Expr<'a>> {
        self.parse_ternary()
    }

    fn parse_path(&mut self) -> ParseResult<Path<'a>> {
        let (first, first_span) = self.ident()?;
        let mut segments = vec![PathSeg {
            name: first,
            span: first_span,
        }];
        let mut span = first_span;
        while self.check(&TokenKind::Dot) && matches!(self.peek_kind_at(1), TokenKind::Ident(_)) {
            self.advance();
            let (name, seg_span) = self.ident()?;
            segments.push(PathSeg {
                name,
                span: seg_span,
            });
            span = span.to(seg_span);
        }
        Ok(self.builder.path(span, segments))
    }

    fn parse_call_args(&mut self) -> ParseResult<(Vec<&'a Expr<'a>>, Span)> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok((args, close.span))
    }
}

impl<'a, 'b, 'd> Parser<'a, 'b, 'd> {
    fn parse_ternary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let cond = self.parse_binary(1)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_expr()?;
        Ok(self
            .builder
            .ternary_expr(cond.span.to(else_expr.span), cond, then_expr, else_expr))
    }

    /// Left-associative precedence climbing.
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<&'a Expr<'a>> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, prec)) = binary_prec(&self.peek().kind) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = self.builder.binary_expr(lhs.span.to(rhs.span), op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let span = self.current_span();
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::PlusPlus => UnaryOp::PreInc,
            TokenKind::MinusMinus => UnaryOp::PreDec,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(self
            .builder
            .unary_expr(span.to(operand.span), op, operand))
    }

    fn parse_postfix(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek().kind {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let close = self.expect(TokenKind::RBracket)?;
                    expr = self
                        .builder
                        .index_expr(expr.span.to(close.span), expr, index);
                }
                TokenKind::PlusPlus => {
                    let token = self.advance();
                    expr = self
                        .builder
                        .unary_expr(expr.span.to(token.span), UnaryOp::PostInc, expr);
                }
                TokenKind::MinusMinus => {
                    let token = self.advance();
                    expr = self
                        .builder
                        .unary_expr(expr.span.to(token.span), UnaryOp::PostDec, expr);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<&'a Expr<'a>> {
        let span = self.current_span();
        let kind = self.peek().kind.clone();
        match kind {
            TokenKind::IntLit { value, unsigned } => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Int { value, unsigned }))
            }
            TokenKind::FloatLit(value) => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Float(value)))
            }
            TokenKind::CharLit(value) => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Char(value)))
            }
            TokenKind::StringLit(value) => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Str(value)))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Bool(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.builder.value_expr(span, Value::Null))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::New => {
                self.advance();
                let path = self.parse_path()?;
                if !self.check(&TokenKind::LParen) {
                    return Err(self.syntax_error("constructor argument list"));
                }
                let (args, end) = self.parse_call_args()?;
                let call = self.builder.call(path, args, true);
                Ok(self.builder.call_expr(span.to(end), call))
            }
            TokenKind::Ident(_) => {
                let path = self.parse_path()?;
                if self.check(&TokenKind::LParen) {
                    let (args, end) = self.parse_call_args()?;
                    let call = self.builder.call(path, args, false);
                    Ok(self.builder.call_expr(span.to(end), call))
                } else {
                    let var_ref = self.builder.var_ref(path);
                    Ok(self.builder.var_ref_expr(path.span, var_ref))
                }
            }
            _ => Err(self.syntax_error("expression")),
        }
    }
}

/// Binary operator precedence, lowest first. Ternary sits below all of
/// these and is handled separately.
fn binary_prec(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::PipePipe => (BinaryOp::Or, 1),
        TokenKind::AmpAmp => (BinaryOp::And, 2),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3),
        TokenKind::Lt => (BinaryOp::Lt, 4),
        TokenKind::LtEq => (BinaryOp::LtEq, 4),
        TokenKind::Gt => (BinaryOp::Gt, 4),
        TokenKind::GtEq => (BinaryOp::GtEq, 4),
        TokenKind::Pipe => (BinaryOp::BitOr, 5),
        TokenKind::Caret => (BinaryOp::BitXor, 5),
        TokenKind::Amp => (BinaryOp::BitAnd, 6),
        TokenKind::Shl => (BinaryOp::Shl, 7),
        TokenKind::Shr => (BinaryOp::Shr, 7),
        TokenKind::Plus => (BinaryOp::Add, 8),
        TokenKind::Minus => (BinaryOp::Sub, 8),
        TokenKind::Star => (BinaryOp::Mul, 9),
        TokenKind::Slash => (BinaryOp::Div, 9),
        TokenKind::Percent => (BinaryOp::Rem, 9),
        _ => return None,
    };
    Some(entry)
}
