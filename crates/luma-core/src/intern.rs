// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! String pool for lexeme interning.
//!
//! Every lexeme the lexer produces is stored exactly once in a
//! [`StringPool`] and referenced by a compact [`Symbol`] handle. Equal
//! byte content always yields the same symbol, so downstream equality
//! checks (keyword comparison, name resolution) are a single `u32`
//! compare instead of a byte scan.
//!
//! The pool stores *byte* strings rather than `str`: decimal escapes in
//! string literals may produce content that is not valid UTF-8 (for
//! example `"\255"` is the single byte 255). Use
//! [`StringPool::resolve_lossy`] when the content is needed for display.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

/// A handle to an interned byte string.
///
/// Symbols are cheap to copy and compare; two symbols are equal if and
/// only if the interned content is byte-for-byte equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    /// The pre-interned empty string. Structural tokens (punctuation,
    /// EOF) carry this symbol as their text.
    pub const EMPTY: Symbol = Symbol(0);

    /// Returns the raw index of this symbol.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Deduplicating storage for lexeme text.
///
/// The pool is passed `&mut` to the lexer (which interns) and `&` to the
/// parser (which only resolves). Interned content lives as long as the
/// pool, which must outlive every token and AST node referencing it.
///
/// # Examples
///
/// ```
/// use luma_core::intern::StringPool;
///
/// let mut pool = StringPool::new();
/// let a = pool.intern(b"hello");
/// let b = pool.intern(b"hello");
/// assert_eq!(a, b);
/// assert_eq!(pool.resolve(a), b"hello");
/// ```
#[derive(Debug)]
pub struct StringPool {
    map: FxHashMap<Box<[u8]>, Symbol>,
    strings: Vec<Box<[u8]>>,
}

impl StringPool {
    /// Creates a new pool with the empty string pre-interned as
    /// [`Symbol::EMPTY`].
    #[must_use]
    pub fn new() -> Self {
        let mut pool = Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty: Box<[u8]> = Box::from(&b""[..]);
        pool.map.insert(empty.clone(), Symbol::EMPTY);
        pool.strings.push(empty);
        pool
    }

    /// Interns a byte string, returning its symbol.
    ///
    /// Two calls with equal content return the identical symbol.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` distinct strings are interned.
    pub fn intern(&mut self, bytes: &[u8]) -> Symbol {
        if let Some(&sym) = self.map.get(bytes) {
            return sym;
        }
        let index = u32::try_from(self.strings.len()).expect("string pool exhausted");
        let sym = Symbol(index);
        let boxed: Box<[u8]> = Box::from(bytes);
        self.map.insert(boxed.clone(), sym);
        self.strings.push(boxed);
        sym
    }

    /// Interns a `str`, returning its symbol.
    pub fn intern_str(&mut self, s: &str) -> Symbol {
        self.intern(s.as_bytes())
    }

    /// Returns the byte content of a symbol.
    ///
    /// # Panics
    ///
    /// Panics if the symbol was produced by a different pool.
    #[must_use]
    pub fn resolve(&self, sym: Symbol) -> &[u8] {
        &self.strings[sym.0 as usize]
    }

    /// Returns the content of a symbol as text, replacing any non-UTF-8
    /// bytes with U+FFFD.
    #[must_use]
    pub fn resolve_lossy(&self, sym: Symbol) -> Cow<'_, str> {
        String::from_utf8_lossy(self.resolve(sym))
    }

    /// Number of distinct strings in the pool (including the empty
    /// string).
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if the pool holds no strings. Never true for a
    /// pool created with [`StringPool::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_pre_interned() {
        let mut pool = StringPool::new();
        assert_eq!(pool.intern(b""), Symbol::EMPTY);
        assert_eq!(pool.resolve(Symbol::EMPTY), b"");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn equal_content_shares_identity() {
        let mut pool = StringPool::new();
        let a = pool.intern(b"local");
        let b = pool.intern(b"local");
        let c = pool.intern(b"locale");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn resolve_round_trips() {
        let mut pool = StringPool::new();
        let sym = pool.intern(b"hello world");
        assert_eq!(pool.resolve(sym), b"hello world");
        assert_eq!(pool.resolve_lossy(sym), "hello world");
    }

    #[test]
    fn non_utf8_content_is_preserved() {
        let mut pool = StringPool::new();
        let sym = pool.intern(&[0xFF]);
        assert_eq!(pool.resolve(sym), &[0xFF]);
        assert_eq!(pool.resolve_lossy(sym), "\u{FFFD}");
    }

    #[test]
    fn intern_str_matches_intern() {
        let mut pool = StringPool::new();
        let a = pool.intern_str("name");
        let b = pool.intern(b"name");
        assert_eq!(a, b);
    }
}
