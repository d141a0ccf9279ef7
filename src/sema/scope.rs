//! Lexical scope stack used during body resolution.

use crate::ast::decl::Var;
use crate::intern::Symbol;
use indexmap::IndexMap;

/// Innermost-last stack of block scopes, each mapping a name to the
/// variable it binds.
#[derive(Default)]
pub struct ScopeStack<'a> {
    scopes: Vec<IndexMap<Symbol, &'a Var<'a>>>,
}

impl<'a> ScopeStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Binds a name in the innermost scope, shadowing nothing: the caller
    /// checks [`ScopeStack::lookup`] first to enforce uniqueness along the
    /// chain.
    pub fn declare(&mut self, name: Symbol, var: &'a Var<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, var);
        }
    }

    /// Innermost-first search along the chain.
    pub fn lookup(&self, name: Symbol) -> Option<&'a Var<'a>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
