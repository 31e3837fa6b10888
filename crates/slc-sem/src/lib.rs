//! The semantic analyzer: name resolution and type checking.
//!
//! Takes the parser's best-effort `Program` and, in place, resolves every
//! identifier against a scope tree and assigns every expression its
//! `Type`. Declaration order doesn't matter: structs and functions are
//! pre-registered in a declaration pass before any body is walked, so
//! forward references and mutual recursion both resolve.

pub mod analyzer;
pub mod scope;

pub use analyzer::{analyze, resolve_type_expr, Analysis};
pub use scope::{SymbolEntry, SymbolKind, SymbolTable};
