//! Diagnostics: stable error kinds, the injected sink, and source-annotated
//! rendering.
//!
//! The pipeline never writes to standard error. Every stage receives a
//! [`Diags`] handle wrapping a caller-provided [`DiagSink`]; rendering is a
//! separate concern done by [`render`] for embedders that want text output.

use crate::source::{SourceMap, Span};
use crate::style::Style;
use std::fmt;

/// Lexical failure details, all reported under the `lexical` kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnterminatedString,
    UnterminatedChar,
    UnterminatedBlockComment,
    EmptyCharLiteral,
    InvalidEscape(char),
    InvalidCharacter(char),
    IntegerOverflow,
    EmptyDigits,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString => write!(f, "unterminated string literal"),
            LexError::UnterminatedChar => write!(f, "unterminated character literal"),
            LexError::UnterminatedBlockComment => write!(f, "unterminated block comment"),
            LexError::EmptyCharLiteral => write!(f, "empty character literal"),
            LexError::InvalidEscape(c) => write!(f, "invalid escape sequence `\\{c}`"),
            LexError::InvalidCharacter(c) => write!(f, "invalid character `{c}`"),
            LexError::IntegerOverflow => write!(f, "integer literal does not fit in 64 bits"),
            LexError::EmptyDigits => write!(f, "numeric literal has no digits"),
        }
    }
}

/// Every diagnostic the front-end can produce. Each variant has a stable
/// identifier returned by [`DiagKind::code`].
#[derive(Debug, Clone, PartialEq)]
pub enum DiagKind {
    Lexical(LexError),
    Syntax { expected: String, found: String },
    DuplicateDecl { name: String },
    UnresolvedRef { name: String },
    TypeMismatch { expected: String, found: String },
    VisibilityViolation { name: String },
    ConstViolation { name: String },
    OverloadAmbiguity { name: String },
    MissingReturn { function: String },
    InheritanceCycle { class: String },
    UnsupportedFailPayload { ty: String },
    Internal { message: String },

    // Warnings
    ImplicitFloatWidening { from: String, to: String },
    EmptyModule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl DiagKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagKind::Lexical(_) => "E0001",
            DiagKind::Syntax { .. } => "E0002",
            DiagKind::DuplicateDecl { .. } => "E0003",
            DiagKind::UnresolvedRef { .. } => "E0004",
            DiagKind::TypeMismatch { .. } => "E0005",
            DiagKind::VisibilityViolation { .. } => "E0006",
            DiagKind::ConstViolation { .. } => "E0007",
            DiagKind::OverloadAmbiguity { .. } => "E0008",
            DiagKind::MissingReturn { .. } => "E0009",
            DiagKind::InheritanceCycle { .. } => "E0010",
            DiagKind::UnsupportedFailPayload { .. } => "E0011",
            DiagKind::Internal { .. } => "E0099",
            DiagKind::ImplicitFloatWidening { .. } => "W0001",
            DiagKind::EmptyModule => "W0002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagKind::ImplicitFloatWidening { .. } | DiagKind::EmptyModule => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagKind::Lexical(err) => write!(f, "{err}"),
            DiagKind::Syntax { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            DiagKind::DuplicateDecl { name } => {
                write!(f, "duplicate declaration of `{name}`")
            }
            DiagKind::UnresolvedRef { name } => write!(f, "unresolved reference `{name}`"),
            DiagKind::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            DiagKind::VisibilityViolation { name } => {
                write!(f, "`{name}` is not visible from here")
            }
            DiagKind::ConstViolation { name } => {
                write!(f, "cannot modify constant `{name}`")
            }
            DiagKind::OverloadAmbiguity { name } => {
                write!(f, "ambiguous call to overloaded `{name}`")
            }
            DiagKind::MissingReturn { function } => {
                write!(f, "function `{function}` does not return on every path")
            }
            DiagKind::InheritanceCycle { class } => {
                write!(f, "inheritance cycle through `{class}`")
            }
            DiagKind::UnsupportedFailPayload { ty } => {
                write!(f, "`fail` payload of type {ty} is not supported")
            }
            DiagKind::Internal { message } => write!(f, "internal error: {message}"),
            DiagKind::ImplicitFloatWidening { from, to } => {
                write!(f, "implicit conversion from {from} to {to}")
            }
            DiagKind::EmptyModule => write!(f, "module contains no definitions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagKind,
}

impl Diagnostic {
    pub fn new(span: Span, kind: DiagKind) -> Self {
        Diagnostic { span, kind }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Injected diagnostic consumer. The core reports; the embedder decides what
/// to do with it.
pub trait DiagSink {
    fn report(&mut self, diag: Diagnostic);
}

/// Sink that collects everything, for tests and batch rendering.
#[derive(Default)]
pub struct CollectSink {
    pub diags: Vec<Diagnostic>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter().filter(|d| d.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.diags.iter().any(|d| d.kind.code() == code)
    }
}

impl DiagSink for CollectSink {
    fn report(&mut self, diag: Diagnostic) {
        self.diags.push(diag);
    }
}

/// Stage-side handle: forwards to the sink and tracks the job-level error
/// flag.
pub struct Diags<'d> {
    sink: &'d mut dyn DiagSink,
    errors_occurred: bool,
}

impl<'d> Diags<'d> {
    pub fn new(sink: &'d mut dyn DiagSink) -> Self {
        Diags {
            sink,
            errors_occurred: false,
        }
    }

    pub fn report(&mut self, span: Span, kind: DiagKind) {
        if kind.severity() == Severity::Error {
            self.errors_occurred = true;
        }
        self.sink.report(Diagnostic::new(span, kind));
    }

    pub fn errors_occurred(&self) -> bool {
        self.errors_occurred
    }
}

/// Render a diagnostic with the offending line and a caret underline.
pub fn render(diag: &Diagnostic, sources: &SourceMap) -> String {
    let buffer = sources.get(diag.span.file);
    let (line, col) = buffer.line_col(diag.span.start);
    let line_content = buffer.line_text(line);
    let underline_len = diag.span.len().max(1).min(line_content.len().max(1));
    let warning = diag.severity() == Severity::Warning;

    let label = match diag.severity() {
        Severity::Error => Style::error_label(diag.kind.code()),
        Severity::Warning => Style::warning_label(diag.kind.code()),
    };

    format!(
        "{}: {}\n  {} {}:{}:{}\n{} {}\n{} {}",
        label,
        diag.kind,
        Style::arrow(),
        buffer.name(),
        line,
        col,
        Style::gutter(line),
        line_content,
        Style::gutter_pad(),
        Style::underline(col, underline_len, warning)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceMap;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            DiagKind::Lexical(LexError::UnterminatedString).code(),
            "E0001"
        );
        assert_eq!(
            DiagKind::UnresolvedRef {
                name: "x".to_string()
            }
            .code(),
            "E0004"
        );
        assert_eq!(
            DiagKind::ImplicitFloatWidening {
                from: "int".to_string(),
                to: "float".to_string()
            }
            .code(),
            "W0001"
        );
    }

    #[test]
    fn warnings_do_not_set_error_flag() {
        let mut sink = CollectSink::new();
        let mut diags = Diags::new(&mut sink);
        diags.report(Span::default(), DiagKind::EmptyModule);
        assert!(!diags.errors_occurred());
        diags.report(
            Span::default(),
            DiagKind::DuplicateDecl {
                name: "x".to_string(),
            },
        );
        assert!(diags.errors_occurred());
        assert_eq!(sink.diags.len(), 2);
    }

    #[test]
    fn render_points_at_offending_line() {
        let mut sources = SourceMap::new();
        let file = sources.add("m.vela", "int x\nint x\n");
        let diag = Diagnostic::new(
            Span::new(file, 10, 11),
            DiagKind::DuplicateDecl {
                name: "x".to_string(),
            },
        );
        let text = render(&diag, &sources);
        assert!(text.contains("duplicate declaration of `x`"));
        assert!(text.contains("m.vela:2:5"));
        assert!(text.contains("int x"));
        assert!(text.contains('^'));
    }
}
