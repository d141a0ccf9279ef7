//! Symbol tables.
//!
//! Every map here is insertion-ordered; iteration order is part of the
//! front-end's determinism contract. Overload sets are a flat
//! insertion-ordered vector of callables with a secondary index by arity.
//!
//! Duplicate insertion fails with [`DuplicateInsert`]; inserting the same
//! declaration node twice is idempotent, which is how header/source
//! redeclarations reconcile.

use crate::ast::decl::{Function, Var};
use crate::ast::module::{Identity, Import};
use crate::intern::Symbol;
use indexmap::IndexMap;

/// Dedicated error for a name already taken in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateInsert;

/// The callables sharing one name in one scope.
#[derive(Default)]
pub struct OverloadSet<'a> {
    funcs: Vec<&'a Function<'a>>,
    by_arity: IndexMap<usize, Vec<usize>>,
}

impl<'a> OverloadSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an overload; re-inserting the same node is a no-op.
    pub fn insert(&mut self, function: &'a Function<'a>) {
        if self.funcs.iter().any(|f| std::ptr::eq(*f, function)) {
            return;
        }
        let index = self.funcs.len();
        self.funcs.push(function);
        self.by_arity
            .entry(function.arity())
            .or_default()
            .push(index);
    }

    /// All overloads in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Function<'a>> + '_ {
        self.funcs.iter().copied()
    }

    /// Overloads of one arity, in insertion order.
    pub fn with_arity(&self, arity: usize) -> impl Iterator<Item = &'a Function<'a>> + '_ {
        self.by_arity
            .get(&arity)
            .into_iter()
            .flatten()
            .map(|&i| self.funcs[i])
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

/// Top-level names of one namespace.
#[derive(Default)]
pub struct NamespaceSymbols<'a> {
    globals: IndexMap<Symbol, &'a Var<'a>>,
    functions: IndexMap<Symbol, OverloadSet<'a>>,
    identities: IndexMap<Symbol, Identity<'a>>,
}

impl<'a> NamespaceSymbols<'a> {
    pub fn insert_global(&mut self, var: &'a Var<'a>) -> Result<(), DuplicateInsert> {
        match self.globals.get(&var.name) {
            Some(existing) if std::ptr::eq(*existing, var) => Ok(()),
            Some(_) => Err(DuplicateInsert),
            None => {
                self.globals.insert(var.name, var);
                Ok(())
            }
        }
    }

    /// Functions share names through overloading, so insertion only fails
    /// if the name is taken by a non-callable.
    pub fn insert_function(&mut self, function: &'a Function<'a>) -> Result<(), DuplicateInsert> {
        if self.globals.contains_key(&function.name) || self.identities.contains_key(&function.name)
        {
            return Err(DuplicateInsert);
        }
        self.functions
            .entry(function.name)
            .or_default()
            .insert(function);
        Ok(())
    }

    pub fn insert_identity(&mut self, identity: Identity<'a>) -> Result<(), DuplicateInsert> {
        let name = identity.name();
        match self.identities.get(&name) {
            Some(existing) if identity_ptr_eq(*existing, identity) => Ok(()),
            Some(_) => Err(DuplicateInsert),
            None => {
                self.identities.insert(name, identity);
                Ok(())
            }
        }
    }

    pub fn global(&self, name: Symbol) -> Option<&'a Var<'a>> {
        self.globals.get(&name).copied()
    }

    pub fn functions(&self, name: Symbol) -> Option<&OverloadSet<'a>> {
        self.functions.get(&name)
    }

    pub fn identity(&self, name: Symbol) -> Option<Identity<'a>> {
        self.identities.get(&name).copied()
    }

    pub fn globals(&self) -> impl Iterator<Item = &'a Var<'a>> + '_ {
        self.globals.values().copied()
    }

    pub fn identities(&self) -> impl Iterator<Item = Identity<'a>> + '_ {
        self.identities.values().copied()
    }

    pub fn function_sets(&self) -> impl Iterator<Item = (Symbol, &OverloadSet<'a>)> + '_ {
        self.functions.iter().map(|(name, set)| (*name, set))
    }
}

fn identity_ptr_eq<'a>(a: Identity<'a>, b: Identity<'a>) -> bool {
    match (a, b) {
        (Identity::Class(x), Identity::Class(y)) => std::ptr::eq(x, y),
        (Identity::Enum(x), Identity::Enum(y)) => std::ptr::eq(x, y),
        _ => false,
    }
}

/// Imports of one module, keyed by the name they are reachable under.
#[derive(Default)]
pub struct ModuleSymbols<'a> {
    imports: IndexMap<Symbol, &'a Import>,
    alias_imports: IndexMap<Symbol, &'a Import>,
}

impl<'a> ModuleSymbols<'a> {
    pub fn insert_import(&mut self, import: &'a Import) -> Result<(), DuplicateInsert> {
        let key = import.local_name();
        match self.imports.get(&key) {
            Some(existing) if std::ptr::eq(*existing, import) => return Ok(()),
            Some(_) => return Err(DuplicateInsert),
            None => {
                self.imports.insert(key, import);
            }
        }
        if let Some(alias) = import.alias {
            self.alias_imports.insert(alias, import);
        }
        Ok(())
    }

    pub fn import(&self, local_name: Symbol) -> Option<&'a Import> {
        self.imports.get(&local_name).copied()
    }

    pub fn alias_import(&self, alias: Symbol) -> Option<&'a Import> {
        self.alias_imports.get(&alias).copied()
    }

    pub fn imports(&self) -> impl Iterator<Item = &'a Import> + '_ {
        self.imports.values().copied()
    }
}

/// Member tables of one class, including members copied down from supers
/// by the resolver.
#[derive(Default)]
pub struct ClassSymbols<'a> {
    attributes: IndexMap<Symbol, &'a Var<'a>>,
    methods: IndexMap<Symbol, OverloadSet<'a>>,
    constructors: OverloadSet<'a>,
}

impl<'a> ClassSymbols<'a> {
    pub fn insert_attribute(&mut self, var: &'a Var<'a>) -> Result<(), DuplicateInsert> {
        match self.attributes.get(&var.name) {
            Some(existing) if std::ptr::eq(*existing, var) => Ok(()),
            Some(_) => Err(DuplicateInsert),
            None => {
                self.attributes.insert(var.name, var);
                Ok(())
            }
        }
    }

    pub fn insert_method(&mut self, method: &'a Function<'a>) -> Result<(), DuplicateInsert> {
        if self.attributes.contains_key(&method.name) {
            return Err(DuplicateInsert);
        }
        self.methods.entry(method.name).or_default().insert(method);
        Ok(())
    }

    pub fn insert_constructor(&mut self, ctor: &'a Function<'a>) {
        self.constructors.insert(ctor);
    }

    pub fn attribute(&self, name: Symbol) -> Option<&'a Var<'a>> {
        self.attributes.get(&name).copied()
    }

    pub fn methods(&self, name: Symbol) -> Option<&OverloadSet<'a>> {
        self.methods.get(&name)
    }

    pub fn constructors(&self) -> &OverloadSet<'a> {
        &self.constructors
    }

    pub fn attributes(&self) -> impl Iterator<Item = &'a Var<'a>> + '_ {
        self.attributes.values().copied()
    }

    pub fn method_sets(&self) -> impl Iterator<Item = (Symbol, &OverloadSet<'a>)> + '_ {
        self.methods.iter().map(|(name, set)| (*name, set))
    }
}

/// All symbols of one compilation job.
#[derive(Default)]
pub struct SymbolTable<'a> {
    namespaces: IndexMap<Symbol, NamespaceSymbols<'a>>,
    modules: IndexMap<u64, ModuleSymbols<'a>>,
    classes: IndexMap<u32, ClassSymbols<'a>>,
    /// Per class: itself followed by its supers in depth-first
    /// left-to-right order, computed by the resolver.
    hierarchies: IndexMap<u32, Vec<&'a crate::ast::decl::Class<'a>>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace_mut(&mut self, name: Symbol) -> &mut NamespaceSymbols<'a> {
        self.namespaces.entry(name).or_default()
    }

    pub fn namespace(&self, name: Symbol) -> Option<&NamespaceSymbols<'a>> {
        self.namespaces.get(&name)
    }

    pub fn module_mut(&mut self, id: u64) -> &mut ModuleSymbols<'a> {
        self.modules.entry(id).or_default()
    }

    pub fn module(&self, id: u64) -> Option<&ModuleSymbols<'a>> {
        self.modules.get(&id)
    }

    pub fn class_mut(&mut self, class_id: u32) -> &mut ClassSymbols<'a> {
        self.classes.entry(class_id).or_default()
    }

    pub fn class(&self, class_id: u32) -> Option<&ClassSymbols<'a>> {
        self.classes.get(&class_id)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (Symbol, &NamespaceSymbols<'a>)> + '_ {
        self.namespaces.iter().map(|(name, ns)| (*name, ns))
    }

    pub fn set_hierarchy(&mut self, class_id: u32, chain: Vec<&'a crate::ast::decl::Class<'a>>) {
        self.hierarchies.insert(class_id, chain);
    }

    /// The class itself plus its linearised supers; empty before linking.
    pub fn hierarchy(&self, class_id: u32) -> &[&'a crate::ast::decl::Class<'a>] {
        self.hierarchies
            .get(&class_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Are the two classes part of one inheritance hierarchy?
    pub fn same_hierarchy(&self, a: u32, b: u32) -> bool {
        a == b
            || self.hierarchy(a).iter().any(|c| c.id == b)
            || self.hierarchy(b).iter().any(|c| c.id == a)
    }
}
