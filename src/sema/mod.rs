pub mod convert;
pub mod resolver;
pub mod scope;
pub mod symbols;
pub mod validator;

pub use resolver::resolve;
pub use symbols::{
    ClassSymbols, DuplicateInsert, ModuleSymbols, NamespaceSymbols, OverloadSet, SymbolTable,
};
pub use validator::validate;
