//! Modules, namespaces, imports, and the module set.

use crate::ast::decl::{Class, Enum, Function, Var};
use crate::intern::Symbol;
use crate::source::{FileId, Span};
use indexmap::IndexMap;
use std::cell::Cell;

/// `import "name"` / `import "name" as "alias"`. The target namespace is
/// attached by the resolver.
#[derive(Debug)]
pub struct Import {
    pub span: Span,
    pub name: Symbol,
    pub name_span: Span,
    pub alias: Option<Symbol>,
    pub alias_span: Option<Span>,
    pub comment: Option<Symbol>,
    pub target_namespace: Cell<Option<Symbol>>,
}

impl Import {
    /// The name this import is reachable under inside its module.
    pub fn local_name(&self) -> Symbol {
        self.alias.unwrap_or(self.name)
    }
}

/// A user-declared identity: class or enum.
#[derive(Debug, Clone, Copy)]
pub enum Identity<'a> {
    Class(&'a Class<'a>),
    Enum(&'a Enum<'a>),
}

impl<'a> Identity<'a> {
    pub fn name(&self) -> Symbol {
        match self {
            Identity::Class(c) => c.name,
            Identity::Enum(e) => e.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Identity::Class(c) => c.span,
            Identity::Enum(e) => e.span,
        }
    }
}

/// One top-level definition, in source order.
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    /// Free-standing comment not claimed by a declaration.
    Comment { text: Symbol, span: Span },
    Import(&'a Import),
    GlobalVar(&'a Var<'a>),
    Function(&'a Function<'a>),
    Class(&'a Class<'a>),
    Enum(&'a Enum<'a>),
}

/// One parsed source file.
pub struct Module<'a> {
    /// Dense, monotonic id assigned by the AST builder; orders modules for
    /// deterministic cross-module resolution.
    pub id: u64,
    pub file: FileId,
    pub name: String,
    pub namespace: Symbol,
    /// All top-level definitions in source order.
    pub definitions: Vec<Definition<'a>>,
    // Bucket views over `definitions`, maintained by the builder.
    pub imports: Vec<&'a Import>,
    pub alias_imports: Vec<&'a Import>,
    pub global_vars: Vec<&'a Var<'a>>,
    pub functions: Vec<&'a Function<'a>>,
    pub identities: Vec<Identity<'a>>,
}

impl<'a> Module<'a> {
    /// Top-level definitions in source order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition<'a>> {
        self.definitions.iter()
    }

    pub fn identity(&self, name: Symbol) -> Option<Identity<'a>> {
        self.identities.iter().copied().find(|i| i.name() == name)
    }
}

/// A named group of modules. The `default` namespace is implicit for
/// modules without a `namespace` header.
#[derive(Debug)]
pub struct Namespace {
    pub name: Symbol,
    /// Member module ids, in module-id order.
    pub modules: Vec<u64>,
}

/// Every module of the compilation job, keyed by module id, grouped into
/// namespaces by the resolver.
pub struct ModuleSet<'a> {
    pub modules: Vec<Module<'a>>,
    pub namespaces: IndexMap<Symbol, Namespace>,
}

impl<'a> ModuleSet<'a> {
    pub fn new(modules: Vec<Module<'a>>) -> Self {
        ModuleSet {
            modules,
            namespaces: IndexMap::new(),
        }
    }

    /// Modules in module-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Module<'a>> {
        self.modules.iter()
    }

    pub fn module(&self, id: u64) -> &Module<'a> {
        &self.modules[id as usize]
    }

    pub fn namespace(&self, name: Symbol) -> Option<&Namespace> {
        self.namespaces.get(&name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
