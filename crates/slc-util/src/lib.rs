//! Foundation types shared by every phase of the compiler: source
//! positions, the diagnostic/error-reporter model, string interning, and
//! the type universe.
//!
//! Nothing in this crate knows about tokens, the AST, or LLVM IR. It
//! exists so that `slc-lex`, `slc-par`, `slc-sem`, `slc-gen` and
//! `slc-drv` all speak the same language for "where in the source did
//! this come from", "how do we report that something went wrong", and
//! "what type is this". The type universe lives here rather than in
//! `slc-sem` because `slc-par`'s AST nodes carry a resolved `Type`
//! directly (there is no separate typed-AST/HIR split in this compiler).

pub mod diagnostic;
pub mod span;
pub mod symbol;
pub mod types;

pub use diagnostic::{Diagnostic, ErrorKind, Reporter, Severity};
pub use span::{SourcePosition, SourceRange};
pub use symbol::{Interner, Pool, Symbol};
pub use types::{Type, TypeRegistry};

pub use rustc_hash::{FxHashMap, FxHashSet};
