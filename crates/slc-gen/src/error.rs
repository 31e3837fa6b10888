//! Error types for LLVM code generation.
//!
//! Every fallible `inkwell` call the emitter makes is wrapped into a
//! [`CodeGenError`] instead of ever unwrapping. Failures split into
//! `CodeGen` (a malformed-but-analyzed program, such as a missing
//! terminator) or `Internal` (a bug in the emitter itself, such as a
//! symbol the analyzer should have already resolved).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    /// An LLVM builder call returned an error (inkwell wraps LLVM's own
    /// `LLVMVerifier`-adjacent failures this way).
    #[error("LLVM operation failed: {0}")]
    LlvmOperationFailed(String),

    /// A non-void function fell off the end of its body without a
    /// `return` on every path.
    #[error("function '{0}' is missing a return on at least one path")]
    MissingTerminator(String),

    /// A declared function has no corresponding LLVM definition at the
    /// point a call site needs it. Always a bug: the analyzer already
    /// validated every call against a declared signature.
    #[error("function '{0}' not found in module")]
    FunctionNotFound(String),

    /// A struct type has no corresponding LLVM type at the point a
    /// field access needs it.
    #[error("struct type '{0}' not found")]
    StructNotFound(String),

    /// A type the analyzer resolved has no counterpart in the lowering
    /// table. Always a bug: the checker and the emitter agree on the
    /// same closed type universe.
    #[error("cannot lower type '{0}' to LLVM IR")]
    TypeMappingError(String),

    /// Indicates a bug in the emitter rather than a malformed program:
    /// an invariant the analyzer should already have guaranteed didn't
    /// hold (an unbound local, an unresolved callee, and so on).
    #[error("internal code generator error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
