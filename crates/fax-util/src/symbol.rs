use rustc_hash::FxHashMap;
use std::fmt;

/// An interned identifier. Two identical source strings (an identifier
/// spelled the same way twice, or the same keyword) always resolve to the
/// same `Symbol`, so symbol-table lookups and AST `data` comparisons are
/// integer comparisons rather than string comparisons.
///
/// The language is single-threaded end to end (see §5 of the spec), so
/// unlike a concurrent compiler's interner this one is a plain owned
/// table threaded through the lexer; there is no global table and no
/// locking.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Owns the backing storage for every `Symbol` produced from a single
/// lex/parse run. Strings are interned by value; look them back up with
/// [`Interner::resolve`].
#[derive(Default)]
pub struct Interner {
    map: FxHashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.map.insert(boxed, sym);
        sym
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        let mut i = Interner::new();
        let a = i.intern("hello");
        let b = i.intern("hello");
        let c = i.intern("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(i.resolve(a), "hello");
        assert_eq!(i.resolve(c), "world");
    }
}
