use crate::ast::types::{FloatKind, IntKind};
use crate::intern::{Interner, Symbol};
use crate::source::Span;

/// The closed token set of the language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Declaration keywords
    Namespace,
    Import,
    As,
    Public,
    Private,
    Protected,
    Const,
    Class,
    Struct,
    Interface,
    Enum,

    // Statement keywords
    If,
    Elsif,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Break,
    Continue,
    Return,
    New,
    Delete,
    Handle,
    Fail,

    // Value keywords
    True,
    False,
    Null,

    // Primitive type keywords
    TyBool,
    TyChar,
    TyString,
    TyVoid,
    TyError,
    TyInt(IntKind),
    TyFloat(FloatKind),

    // Identifiers and literals
    Ident(Symbol),
    IntLit { value: u64, unsigned: bool },
    FloatLit(f64),
    CharLit(char),
    StringLit(Symbol),

    // Punctuators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Question,

    // Assignment operators
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,

    // Arithmetic and bitwise operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,

    // Logical and comparison operators
    AmpAmp,
    PipePipe,
    Bang,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Increment / decrement
    PlusPlus,
    MinusMinus,

    Eof,
}

impl TokenKind {
    /// True for keywords that may begin a primitive type.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::TyBool
                | TokenKind::TyChar
                | TokenKind::TyString
                | TokenKind::TyVoid
                | TokenKind::TyError
                | TokenKind::TyInt(_)
                | TokenKind::TyFloat(_)
        )
    }

    pub fn is_assign_op(&self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::PlusAssign
                | TokenKind::MinusAssign
                | TokenKind::StarAssign
                | TokenKind::SlashAssign
                | TokenKind::PercentAssign
                | TokenKind::AmpAssign
                | TokenKind::PipeAssign
                | TokenKind::CaretAssign
                | TokenKind::ShlAssign
                | TokenKind::ShrAssign
        )
    }

    /// Human-readable description for diagnostics.
    pub fn describe(&self, interner: &Interner) -> String {
        match self {
            TokenKind::Ident(sym) => format!("identifier `{}`", interner.resolve(*sym)),
            TokenKind::IntLit { value, .. } => format!("integer literal `{value}`"),
            TokenKind::FloatLit(v) => format!("floating literal `{v}`"),
            TokenKind::CharLit(c) => format!("character literal `{c}`"),
            TokenKind::StringLit(sym) => {
                format!("string literal \"{}\"", interner.resolve(*sym))
            }
            TokenKind::Eof => "end of file".to_string(),
            other => format!("`{}`", other.fixed_text()),
        }
    }

    /// Surface text of keywords and punctuators.
    fn fixed_text(&self) -> &'static str {
        match self {
            TokenKind::Namespace => "namespace",
            TokenKind::Import => "import",
            TokenKind::As => "as",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Protected => "protected",
            TokenKind::Const => "const",
            TokenKind::Class => "class",
            TokenKind::Struct => "struct",
            TokenKind::Interface => "interface",
            TokenKind::Enum => "enum",
            TokenKind::If => "if",
            TokenKind::Elsif => "elsif",
            TokenKind::Else => "else",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::New => "new",
            TokenKind::Delete => "delete",
            TokenKind::Handle => "handle",
            TokenKind::Fail => "fail",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::TyBool => "bool",
            TokenKind::TyChar => "char",
            TokenKind::TyString => "string",
            TokenKind::TyVoid => "void",
            TokenKind::TyError => "error",
            TokenKind::TyInt(kind) => kind.name(),
            TokenKind::TyFloat(kind) => kind.name(),
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Question => "?",
            TokenKind::Assign => "=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::PercentAssign => "%=",
            TokenKind::AmpAssign => "&=",
            TokenKind::PipeAssign => "|=",
            TokenKind::CaretAssign => "^=",
            TokenKind::ShlAssign => "<<=",
            TokenKind::ShrAssign => ">>=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            _ => unreachable!("token has no fixed surface text"),
        }
    }
}

/// One lexed token. `comment` carries the text of the comment run that
/// immediately precedes the token, so declarations can claim it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub comment: Option<Symbol>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            span,
            comment: None,
        }
    }
}

/// Keyword table; returns `None` for plain identifiers.
pub fn keyword(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "namespace" => TokenKind::Namespace,
        "import" => TokenKind::Import,
        "as" => TokenKind::As,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "const" => TokenKind::Const,
        "class" => TokenKind::Class,
        "struct" => TokenKind::Struct,
        "interface" => TokenKind::Interface,
        "enum" => TokenKind::Enum,
        "if" => TokenKind::If,
        "elsif" => TokenKind::Elsif,
        "else" => TokenKind::Else,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "new" => TokenKind::New,
        "delete" => TokenKind::Delete,
        "handle" => TokenKind::Handle,
        "fail" => TokenKind::Fail,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "bool" => TokenKind::TyBool,
        "char" => TokenKind::TyChar,
        "string" => TokenKind::TyString,
        "void" => TokenKind::TyVoid,
        "error" => TokenKind::TyError,
        "byte" => TokenKind::TyInt(IntKind::Byte),
        "short" => TokenKind::TyInt(IntKind::Short),
        "ushort" => TokenKind::TyInt(IntKind::Ushort),
        "int" => TokenKind::TyInt(IntKind::Int),
        "uint" => TokenKind::TyInt(IntKind::Uint),
        "long" => TokenKind::TyInt(IntKind::Long),
        "ulong" => TokenKind::TyInt(IntKind::Ulong),
        "float" => TokenKind::TyFloat(FloatKind::Float),
        "double" => TokenKind::TyFloat(FloatKind::Double),
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(keyword("namespace"), Some(TokenKind::Namespace));
        assert_eq!(keyword("fail"), Some(TokenKind::Fail));
        assert_eq!(keyword("uint"), Some(TokenKind::TyInt(IntKind::Uint)));
        assert_eq!(keyword("double"), Some(TokenKind::TyFloat(FloatKind::Double)));
    }

    #[test]
    fn identifiers_are_not_keywords() {
        assert_eq!(keyword("namespaced"), None);
        assert_eq!(keyword("Fail"), None);
        assert_eq!(keyword(""), None);
    }

    #[test]
    fn type_keywords_classify() {
        assert!(TokenKind::TyVoid.is_type_keyword());
        assert!(TokenKind::TyInt(IntKind::Byte).is_type_keyword());
        assert!(!TokenKind::Class.is_type_keyword());
    }

    #[test]
    fn assign_ops_classify() {
        assert!(TokenKind::Assign.is_assign_op());
        assert!(TokenKind::ShlAssign.is_assign_op());
        assert!(!TokenKind::EqEq.is_assign_op());
    }
}
