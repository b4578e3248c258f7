//! Interned names for record fields, namespaces and named types.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// Two symbols from the same [`Interner`] are equal iff their strings are
/// equal, so symbols can sit inside hashed type keys without re-hashing text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    /// Creates a symbol from a raw index. Only meaningful for the interner
    /// that produced the index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this symbol.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Symbol` wraps a `u32`; `try_from_usize` rejects anything wider.
unsafe impl lasso::Key for Symbol {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Symbol)
    }
}

/// String interner backed by [`lasso::ThreadedRodeo`].
///
/// Interning goes through `&self`, which lets a context hand out symbols
/// while other parts of it are borrowed.
pub struct Interner {
    rodeo: ThreadedRodeo<Symbol>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning the existing symbol if it was seen before.
    pub fn intern(&self, s: &str) -> Symbol {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up `s` without interning it.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.rodeo.get(s)
    }

    /// Resolves a symbol back to its string.
    ///
    /// # Panics
    ///
    /// Panics if the symbol was not created by this interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.rodeo.resolve(&sym)
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
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
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let sym = interner.intern("data");
        assert_eq!(interner.resolve(sym), "data");
    }

    #[test]
    fn same_string_same_symbol() {
        let interner = Interner::new();
        assert_eq!(interner.intern("clk"), interner.intern("clk"));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("rst").is_none());
        assert!(interner.is_empty());
        let sym = interner.intern("rst");
        assert_eq!(interner.get("rst"), Some(sym));
    }

    #[test]
    fn serde_roundtrip() {
        let sym = Symbol::from_raw(3);
        let json = serde_json::to_string(&sym).unwrap();
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(sym, back);
    }
}
