//! Hand-written lexer.
//!
//! Walks the source bytes once and produces the full token vector; the
//! parser does its lookahead over that vector. Comments are not tokens:
//! each comment run is attached to the token that follows it, which is how
//! declarations end up owning the comment written above them.
//!
//! The lexer reports only genuine lexical failures (unterminated literals
//! and comments, invalid characters). Anything else surprising is handed to
//! the parser as an ordinary token.

use crate::diag::{DiagKind, Diags, LexError};
use crate::intern::Interner;
use crate::source::{FileId, Span};
use crate::token::{keyword, Token, TokenKind};

pub struct Lexer<'s, 'i> {
    file: FileId,
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    interner: &'i mut Interner,
    /// Comment text waiting to be attached to the next token.
    pending_comment: Option<String>,
}

impl<'s, 'i> Lexer<'s, 'i> {
    pub fn new(file: FileId, source: &'s str, interner: &'i mut Interner) -> Self {
        Lexer {
            file,
            source,
            bytes: source.as_bytes(),
            pos: 0,
            interner,
            pending_comment: None,
        }
    }

    pub fn tokenize(&mut self, diags: &mut Diags<'_>) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia(diags);
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            if let Some(kind) = self.next_kind(diags) {
                let mut token = Token::new(kind, self.span_from(start));
                token.comment = self.take_comment();
                tokens.push(token);
            }
        }
        let mut eof = Token::new(TokenKind::Eof, self.span_from(self.pos));
        eof.comment = self.take_comment();
        tokens.push(eof);
        tokens
    }

    fn take_comment(&mut self) -> Option<crate::intern::Symbol> {
        self.pending_comment
            .take()
            .map(|text| self.interner.intern(&text))
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start, self.pos)
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn bump(&mut self) -> u8 {
        let b = self.peek();
        self.pos += 1;
        b
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == b {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // ----- trivia -----------------------------------------------------------

    fn skip_trivia(&mut self, diags: &mut Diags<'_>) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.pos += 1;
                }
                b'/' if self.peek_at(1) == b'/' => self.line_comment(),
                b'/' if self.peek_at(1) == b'*' => self.block_comment(diags),
                _ => break,
            }
        }
    }

    fn line_comment(&mut self) {
        self.pos += 2;
        let start = self.pos;
        while self.pos < self.bytes.len() && self.peek() != b'\n' {
            self.pos += 1;
        }
        let text = self.source[start..self.pos].trim();
        self.append_comment(text);
    }

    fn block_comment(&mut self, diags: &mut Diags<'_>) {
        let open = self.pos;
        self.pos += 2;
        let start = self.pos;
        loop {
            if self.pos + 1 >= self.bytes.len() {
                // Ran off the end without `*/`.
                if self.pos < self.bytes.len() {
                    self.pos = self.bytes.len();
                }
                diags.report(
                    Span::new(self.file, open, open + 2),
                    DiagKind::Lexical(LexError::UnterminatedBlockComment),
                );
                return;
            }
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
                break;
            }
            self.pos += 1;
        }
        let text = self.source[start..self.pos].trim();
        self.pos += 2;
        self.append_comment(text);
    }

    fn append_comment(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.pending_comment {
            Some(pending) => {
                pending.push('\n');
                pending.push_str(text);
            }
            None => self.pending_comment = Some(text.to_string()),
        }
    }

    // ----- tokens -----------------------------------------------------------

    fn next_kind(&mut self, diags: &mut Diags<'_>) -> Option<TokenKind> {
        let b = self.peek();
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => Some(self.identifier()),
            b'0'..=b'9' => Some(self.number(diags)),
            b'\'' => self.char_literal(diags),
            b'"' => self.string_literal(diags),
            _ => self.punctuator(diags),
        }
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        keyword(text).unwrap_or_else(|| TokenKind::Ident(self.interner.intern(text)))
    }

    fn number(&mut self, diags: &mut Diags<'_>) -> TokenKind {
        let start = self.pos;

        if self.peek() == b'0' {
            let (radix, prefix_len) = match self.peek_at(1) {
                b'x' | b'X' => (16, 2),
                b'o' | b'O' => (8, 2),
                b'b' | b'B' => (2, 2),
                _ => (10, 0),
            };
            if radix != 10 {
                self.pos += prefix_len;
                return self.radix_integer(start, radix, diags);
            }
        }

        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }

        // Float on the presence of `.` followed by a digit.
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            self.pos += 1;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
            let text = &self.source[start..self.pos];
            return match text.parse::<f64>() {
                Ok(value) => TokenKind::FloatLit(value),
                Err(_) => {
                    diags.report(
                        self.span_from(start),
                        DiagKind::Lexical(LexError::EmptyDigits),
                    );
                    TokenKind::FloatLit(0.0)
                }
            };
        }

        let text = &self.source[start..self.pos];
        let unsigned = self.eat(b'u') || self.eat(b'U');
        match text.parse::<u64>() {
            Ok(value) => TokenKind::IntLit { value, unsigned },
            Err(_) => {
                diags.report(
                    self.span_from(start),
                    DiagKind::Lexical(LexError::IntegerOverflow),
                );
                TokenKind::IntLit { value: 0, unsigned }
            }
        }
    }

    fn radix_integer(&mut self, start: usize, radix: u32, diags: &mut Diags<'_>) -> TokenKind {
        let digits_start = self.pos;
        while (self.peek() as char).is_digit(radix) {
            self.pos += 1;
        }
        let digits = &self.source[digits_start..self.pos];
        let unsigned = self.eat(b'u') || self.eat(b'U');
        if digits.is_empty() {
            diags.report(
                self.span_from(start),
                DiagKind::Lexical(LexError::EmptyDigits),
            );
            return TokenKind::IntLit { value: 0, unsigned };
        }
        match u64::from_str_radix(digits, radix) {
            Ok(value) => TokenKind::IntLit { value, unsigned },
            Err(_) => {
                diags.report(
                    self.span_from(start),
                    DiagKind::Lexical(LexError::IntegerOverflow),
                );
                TokenKind::IntLit { value: 0, unsigned }
            }
        }
    }

    fn escape(&mut self, diags: &mut Diags<'_>) -> char {
        // Caller consumed the backslash.
        let b = self.bump();
        match b {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'\\' => '\\',
            b'\'' => '\'',
            b'"' => '"',
            b'0' => '\0',
            other => {
                let c = other as char;
                diags.report(
                    Span::new(self.file, self.pos - 2, self.pos),
                    DiagKind::Lexical(LexError::InvalidEscape(c)),
                );
                c
            }
        }
    }

    fn char_literal(&mut self, diags: &mut Diags<'_>) -> Option<TokenKind> {
        let open = self.pos;
        self.pos += 1;
        if self.peek() == b'\'' {
            self.pos += 1;
            diags.report(
                Span::new(self.file, open, self.pos),
                DiagKind::Lexical(LexError::EmptyCharLiteral),
            );
            return Some(TokenKind::CharLit('\0'));
        }
        let value = match self.peek() {
            0 | b'\n' => {
                diags.report(
                    Span::new(self.file, open, open + 1),
                    DiagKind::Lexical(LexError::UnterminatedChar),
                );
                return None;
            }
            b'\\' => {
                self.pos += 1;
                self.escape(diags)
            }
            _ => {
                let c = self.source[self.pos..].chars().next().unwrap_or('\0');
                self.pos += c.len_utf8();
                c
            }
        };
        if !self.eat(b'\'') {
            diags.report(
                Span::new(self.file, open, open + 1),
                DiagKind::Lexical(LexError::UnterminatedChar),
            );
        }
        Some(TokenKind::CharLit(value))
    }

    fn string_literal(&mut self, diags: &mut Diags<'_>) -> Option<TokenKind> {
        let open = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                0 if self.pos >= self.bytes.len() => {
                    diags.report(
                        Span::new(self.file, open, open + 1),
                        DiagKind::Lexical(LexError::UnterminatedString),
                    );
                    return None;
                }
                b'\n' => {
                    diags.report(
                        Span::new(self.file, open, open + 1),
                        DiagKind::Lexical(LexError::UnterminatedString),
                    );
                    return None;
                }
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    value.push(self.escape(diags));
                }
                _ => {
                    let c = self.source[self.pos..].chars().next().unwrap_or('\0');
                    self.pos += c.len_utf8();
                    value.push(c);
                }
            }
        }
        Some(TokenKind::StringLit(self.interner.intern(&value)))
    }

    fn punctuator(&mut self, diags: &mut Diags<'_>) -> Option<TokenKind> {
        let start = self.pos;
        let b = self.bump();
        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semicolon,
            b'?' => TokenKind::Question,
            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat(b'=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat(b'=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.eat(b'=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.eat(b'=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => {
                if self.eat(b'=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AmpAmp
                } else if self.eat(b'=') {
                    TokenKind::AmpAssign
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::PipePipe
                } else if self.eat(b'=') {
                    TokenKind::PipeAssign
                } else {
                    TokenKind::Pipe
                }
            }
            b'^' => {
                if self.eat(b'=') {
                    TokenKind::CaretAssign
                } else {
                    TokenKind::Caret
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            b'<' => {
                if self.eat(b'<') {
                    if self.eat(b'=') {
                        TokenKind::ShlAssign
                    } else {
                        TokenKind::Shl
                    }
                } else if self.eat(b'=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.eat(b'>') {
                    if self.eat(b'=') {
                        TokenKind::ShrAssign
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat(b'=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            _ => {
                // Re-decode as a char so multi-byte input is reported and
                // skipped whole.
                let c = self.source[start..].chars().next().unwrap_or('\u{fffd}');
                self.pos = start + c.len_utf8();
                diags.report(
                    Span::new(self.file, start, self.pos),
                    DiagKind::Lexical(LexError::InvalidCharacter(c)),
                );
                return None;
            }
        };
        Some(kind)
    }
}
