//! String interning.
//!
//! [`Symbol`] is a cheap-to-clone handle onto an interned string, used for
//! identifiers, keywords, struct/field names and filenames throughout the
//! compiler. Unlike an interner that leaks every string for `'static`
//! lifetime, ours is reference-counted: a string is interned for as long as
//! at least one [`Symbol`] handle to it is alive, and is released once the
//! last handle is dropped (per the compiler's memory-pool contract).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// A reference-counted, interned string.
///
/// Two `Symbol`s compare equal iff their text is equal; interning just
/// means repeated `intern()` calls for the same text share one allocation
/// while any handle to it is alive.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Borrows the interned text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The process-local string interner.
///
/// Backed by a map from text to a [`Weak`] handle on the same allocation;
/// `intern` upgrades the weak handle when the string is still live, and
/// allocates a fresh one (recording a new weak handle) otherwise. Dead
/// entries accumulate until [`Interner::release_unused`] is called, which
/// is the "release all" operation in the compiler's memory-pool contract.
/// Safe to call at any time since it only evicts entries whose strong
/// count has already dropped to zero.
///
/// Single-threaded by construction (`RefCell`, not a lock): the pipeline
/// never interns concurrently within one `compile()` call. A caller that
/// wants to share one `Interner` across threads would need to swap this
/// for a `Mutex`-guarded table; nothing in this workspace needs that.
#[derive(Default)]
pub struct Interner {
    table: RefCell<HashMap<Rc<str>, Weak<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `text`, returning a handle to the shared allocation.
    pub fn intern(&self, text: &str) -> Symbol {
        let mut table = self.table.borrow_mut();
        if let Some(weak) = table.get(text) {
            if let Some(rc) = weak.upgrade() {
                return Symbol(rc);
            }
        }
        let rc: Rc<str> = Rc::from(text);
        table.insert(rc.clone(), Rc::downgrade(&rc));
        Symbol(rc)
    }

    /// Drops table entries whose last `Symbol` handle has already gone
    /// away. Never invalidates a live `Symbol`.
    pub fn release_unused(&self) {
        self.table
            .borrow_mut()
            .retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of entries currently tracked, live or not. Mostly useful
    /// for tests asserting that interning dedups.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The compiler's process-local memory pool.
///
/// Per the resource model, the pool owns string-literal interning; AST
/// node allocation is ordinary `Box` ownership and needs no pooling of
/// its own, since Rust's allocator already gives the AST the single-owner
/// tree shape the pool exists to provide in a language without one.
#[derive(Default)]
pub struct Pool {
    interner: Interner,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    /// Releases pooled resources that no longer have live handles. Called
    /// between `compile()` invocations as part of the pipeline reset.
    pub fn release_all(&self) {
        self.interner.release_unused();
    }

    /// Number of strings currently tracked by the pool, live or not:
    /// the memory-manager counter surfaced by the driver's stats accessor.
    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_shares_allocation() {
        let interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hello");
    }

    #[test]
    fn distinct_text_is_distinct() {
        let interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn dropping_last_handle_allows_release() {
        let interner = Interner::new();
        {
            let _a = interner.intern("transient");
            assert_eq!(interner.len(), 1);
        }
        interner.release_unused();
        assert_eq!(interner.len(), 0);
    }

    #[test]
    fn live_handle_survives_release() {
        let interner = Interner::new();
        let a = interner.intern("kept");
        interner.release_unused();
        assert_eq!(a.as_str(), "kept");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn pool_reuses_interner_across_calls() {
        let pool = Pool::new();
        let a = pool.intern("x");
        let b = pool.intern("x");
        assert_eq!(a, b);
        pool.release_all();
    }
}
