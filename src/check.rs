//! The front-end pipeline: parse every module, resolve, validate.
//!
//! One driver thread runs the stages in order. Parsing touches no shared
//! state and could be fanned out per module; the resolver and validator
//! mutate the symbol table and annotation cells and must run serially, so
//! the driver keeps the whole pipeline sequential.

use crate::arena::Arena;
use crate::ast::builder::AstBuilder;
use crate::ast::module::ModuleSet;
use crate::diag::{DiagSink, Diags};
use crate::intern::Interner;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::sema::resolver::resolve;
use crate::sema::symbols::SymbolTable;
use crate::sema::validator::validate;
use crate::source::SourceMap;

/// One input compilation unit: a file name and its UTF-8 contents.
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceFile {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Everything the pipeline produced. The module set is the output contract
/// for the code generator; `errors_occurred` is the job-level failure flag.
pub struct CheckResult<'a> {
    pub modules: ModuleSet<'a>,
    pub symbols: SymbolTable<'a>,
    pub sources: SourceMap,
    pub errors_occurred: bool,
}

/// Runs the full pipeline over a set of in-memory sources.
///
/// The caller owns the arena (and with it every AST node of the job) and
/// the diagnostic sink. Modules come out in input order, which is also
/// module-id order.
pub fn check<'a>(
    arena: &'a Arena,
    interner: &mut Interner,
    inputs: &[SourceFile],
    sink: &mut dyn DiagSink,
) -> CheckResult<'a> {
    let mut diags = Diags::new(sink);
    let mut sources = SourceMap::new();
    let mut builder = AstBuilder::new(arena);

    let mut modules = Vec::with_capacity(inputs.len());
    for input in inputs {
        let file = sources.add(&input.name, &input.text);
        let tokens = {
            let mut lexer = Lexer::new(file, sources.get(file).text(), interner);
            lexer.tokenize(&mut diags)
        };
        let module = builder.create_module(file, &input.name);
        let parser = Parser::new(tokens, &mut builder, interner, &mut diags, module);
        modules.push(parser.parse_module());
    }

    let mut set = ModuleSet::new(modules);
    let symbols = resolve(&mut set, &builder, interner, &mut diags);
    validate(&set, &symbols, &builder, interner, &mut diags);

    CheckResult {
        modules: set,
        symbols,
        sources,
        errors_occurred: diags.errors_occurred(),
    }
}
