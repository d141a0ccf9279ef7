use std::collections::HashMap;

/// Interned identifier or literal text. Copyable, cheap to compare, and
/// usable as a map key everywhere the symbol tables need one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    /// The empty string.
    pub const EMPTY: Symbol = Symbol(0);
    /// `default`, the implicit namespace of modules without a header.
    pub const DEFAULT_NS: Symbol = Symbol(1);
    /// `error`, the name of every hidden error-handler parameter and of
    /// bare handle-block variables.
    pub const ERROR: Symbol = Symbol(2);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Names the language needs before any source is lexed, in [`Symbol`] id
/// order. The AST builder names its synthesised declarations after these,
/// so their symbols are compile-time constants rather than lookups.
const WELL_KNOWN: &[&str] = &["", "default", "error"];

/// String interner. Every interner starts with the well-known names in
/// their fixed slots; source text fills the rest.
pub struct Interner {
    map: HashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        let mut interner = Interner {
            map: HashMap::new(),
            strings: Vec::new(),
        };
        for name in WELL_KNOWN {
            interner.intern(name);
        }
        interner
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let owned: Box<str> = Box::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, sym);
        sym
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index()]
    }

    /// Look up without creating a new entry.
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    /// Interned entries, the well-known names included.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True while nothing beyond the well-known names was interned.
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= WELL_KNOWN.len()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names_occupy_fixed_slots() {
        let interner = Interner::new();
        assert_eq!(interner.resolve(Symbol::EMPTY), "");
        assert_eq!(interner.resolve(Symbol::DEFAULT_NS), "default");
        assert_eq!(interner.resolve(Symbol::ERROR), "error");
    }

    #[test]
    fn interning_a_well_known_name_reuses_its_slot() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern("error"), Symbol::ERROR);
        assert_eq!(interner.intern("default"), Symbol::DEFAULT_NS);
        assert_eq!(interner.len(), WELL_KNOWN.len());
    }

    #[test]
    fn same_string_same_symbol() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern("alpha"), interner.intern("alpha"));
    }

    #[test]
    fn different_strings_different_symbols() {
        let mut interner = Interner::new();
        assert_ne!(interner.intern("alpha"), interner.intern("beta"));
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("namespace");
        assert_eq!(interner.resolve(sym), "namespace");
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = Interner::new();
        assert_eq!(interner.lookup("x"), None);
        let before = interner.len();
        let sym = interner.intern("x");
        assert_eq!(interner.lookup("x"), Some(sym));
        assert_eq!(interner.len(), before + 1);
    }

    #[test]
    fn is_empty_ignores_well_known_names() {
        let mut interner = Interner::new();
        assert!(interner.is_empty());
        interner.intern("error");
        assert!(interner.is_empty());
        interner.intern("something");
        assert!(!interner.is_empty());
    }

    #[test]
    fn symbols_are_case_sensitive() {
        let mut interner = Interner::new();
        let upper = interner.intern("Point");
        let lower = interner.intern("point");
        assert_ne!(upper, lower);
    }
}
