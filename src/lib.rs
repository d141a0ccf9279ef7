//! Front-end for the Vela systems language.
//!
//! The pipeline turns UTF-8 source text into a fully-resolved, validated
//! module set ready for lowering: *source → tokens → unresolved AST →
//! resolved AST → validated AST*. The three core subsystems are the
//! [`lexer`]/[`parser`] pair, the symbol table and [`sema::resolver`], and
//! the [`sema::validator`] type checker.
//!
//! The crate performs no I/O and writes nothing to standard error: sources
//! arrive as in-memory buffers and diagnostics leave through an injected
//! [`diag::DiagSink`].
//!
//! ```
//! use vela::{check, Arena, CollectSink, Interner, SourceFile};
//!
//! let arena = Arena::new();
//! let mut interner = Interner::new();
//! let mut sink = CollectSink::new();
//! let result = check(
//!     &arena,
//!     &mut interner,
//!     &[SourceFile::new("point.vela", "int origin = 0")],
//!     &mut sink,
//! );
//! assert!(!result.errors_occurred);
//! ```

pub mod arena;
pub mod ast;
pub mod check;
pub mod debug;
pub mod diag;
pub mod intern;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod source;
pub mod style;
pub mod token;

pub use arena::Arena;
pub use check::{check, CheckResult, SourceFile};
pub use debug::{dump_module, DisplayWith, WithInterner};
pub use diag::{CollectSink, DiagKind, DiagSink, Diagnostic, Diags, LexError, Severity};
pub use intern::{Interner, Symbol};
pub use lexer::Lexer;
pub use parser::Parser;
pub use sema::{resolve, validate, SymbolTable};
pub use source::{FileId, SourceBuffer, SourceMap, Span};
pub use style::Style;
pub use token::{Token, TokenKind};
