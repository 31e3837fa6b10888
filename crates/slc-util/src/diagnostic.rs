//! Diagnostics and the error reporter.
//!
//! Every phase of the pipeline reports problems as [`Diagnostic`]s rather
//! than by raising: lexical, syntax, semantic, type-check, code-gen and
//! internal errors all flow through the same [`Reporter`], which the
//! pipeline consults between phases to decide whether to keep going.
//!
//! Rendering a diagnostic with a source excerpt and a caret under the
//! offending column is the error reporter's job in the surrounding tool,
//! not this crate's. We only produce the structured data and the plain
//! `file:line:col: kind: message` line.

use crate::span::SourceRange;
use std::fmt;

/// The six error categories the compiler can emit.
///
/// Lexical errors originate only in the lexer, syntax errors only in the
/// parser, semantic and type-check errors only in the analyzer, and
/// code-gen errors only in the emitter for AST shapes that should have
/// been rejected earlier (so, in practice, bugs). `Internal` is reserved
/// for invariant violations detected anywhere in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    TypeCheck,
    CodeGen,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Semantic => "semantic error",
            ErrorKind::TypeCheck => "type error",
            ErrorKind::CodeGen => "code generation error",
            ErrorKind::Internal => "internal error",
        };
        write!(f, "{s}")
    }
}

/// Whether a diagnostic blocks compilation or merely warns about it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic: what kind of problem, how severe, where, and any
/// extra context or hints to help the reader fix it.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub range: SourceRange,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, message: impl Into<String>, range: SourceRange) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            range,
            context: None,
            hints: Vec::new(),
        }
    }

    pub fn warning(kind: ErrorKind, message: impl Into<String>, range: SourceRange) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            range,
            context: None,
            hints: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}: {}",
            self.range.start, self.kind, self.message
        )?;
        if let Some(context) = &self.context {
            writeln!(f, "  {context}")?;
        }
        for hint in &self.hints {
            writeln!(f, "  Hint: {hint}")?;
        }
        Ok(())
    }
}

/// Default cap on accumulated errors before the reporter stops recording
/// new ones (it keeps counting, it just stops storing the overflow).
pub const DEFAULT_MAX_ERRORS: usize = 100;
/// Default cap on accumulated warnings.
pub const DEFAULT_MAX_WARNINGS: usize = 50;

/// Accumulates diagnostics across a `compile()` call.
///
/// The pipeline queries [`Reporter::has_errors`] between phases and
/// aborts the remaining phases if it returns `true`. Warnings never abort
/// anything unless [`Reporter::promote_warnings_to_errors`] is called
/// (the CLI's `-Werror` behavior), which turns every accumulated
/// warning into a `TypeCheck` error and empties the warning list.
pub struct Reporter {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    max_errors: usize,
    max_warnings: usize,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            error_count: 0,
            warning_count: 0,
            max_errors: DEFAULT_MAX_ERRORS,
            max_warnings: DEFAULT_MAX_WARNINGS,
        }
    }

    /// Records a diagnostic, respecting the configured caps. The running
    /// counts (`error_count`/`warning_count`) always increase even once a
    /// cap is hit, so stats reflect the true number of problems found.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                self.error_count += 1;
                if self.errors.len() < self.max_errors {
                    self.errors.push(diagnostic);
                }
            }
            Severity::Warning => {
                self.warning_count += 1;
                if self.warnings.len() < self.max_warnings {
                    self.warnings.push(diagnostic);
                }
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Turns every recorded warning into a `TypeCheck` error (`-Werror`).
    pub fn promote_warnings_to_errors(&mut self) {
        let warnings = std::mem::take(&mut self.warnings);
        self.warning_count = 0;
        for mut warning in warnings {
            warning.severity = Severity::Error;
            warning.kind = ErrorKind::TypeCheck;
            self.error_count += 1;
            if self.errors.len() < self.max_errors {
                self.errors.push(warning);
            }
        }
    }

    /// Returns diagnostics sorted by source position, for callers that
    /// want deterministic, position-ordered output regardless of
    /// discovery order.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<&Diagnostic> = self.errors.iter().chain(self.warnings.iter()).collect();
        all.sort_by_key(|d| d.range.start);
        all
    }

    /// Clears all accumulated diagnostics and counts, used when resetting
    /// the pipeline between `compile()` calls.
    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Interner;
    use crate::span::SourcePosition;

    fn range(interner: &Interner, line: u32) -> SourceRange {
        let file = interner.intern("t.sl");
        let pos = SourcePosition {
            file,
            line,
            column: 1,
            offset: 0,
        };
        SourceRange::point(pos)
    }

    #[test]
    fn reports_accumulate_by_severity() {
        let interner = Interner::new();
        let mut reporter = Reporter::new();
        reporter.report(Diagnostic::error(ErrorKind::Syntax, "oops", range(&interner, 1)));
        reporter.report(Diagnostic::warning(ErrorKind::Semantic, "hm", range(&interner, 2)));
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.warning_count(), 1);
        assert!(reporter.has_errors());
    }

    #[test]
    fn promoting_warnings_moves_them_to_errors_as_typecheck() {
        let interner = Interner::new();
        let mut reporter = Reporter::new();
        reporter.report(Diagnostic::warning(ErrorKind::Semantic, "hm", range(&interner, 2)));
        reporter.promote_warnings_to_errors();
        assert_eq!(reporter.warning_count(), 0);
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.errors()[0].kind, ErrorKind::TypeCheck);
    }

    #[test]
    fn caps_stop_storing_but_not_counting() {
        let interner = Interner::new();
        let mut reporter = Reporter::new();
        for i in 0..(DEFAULT_MAX_ERRORS + 10) {
            reporter.report(Diagnostic::error(
                ErrorKind::Syntax,
                "oops",
                range(&interner, i as u32 + 1),
            ));
        }
        assert_eq!(reporter.error_count(), DEFAULT_MAX_ERRORS + 10);
        assert_eq!(reporter.errors().len(), DEFAULT_MAX_ERRORS);
    }

    #[test]
    fn sorted_orders_by_position() {
        let interner = Interner::new();
        let mut reporter = Reporter::new();
        reporter.report(Diagnostic::error(ErrorKind::Syntax, "b", range(&interner, 5)));
        reporter.report(Diagnostic::error(ErrorKind::Syntax, "a", range(&interner, 1)));
        let sorted = reporter.sorted();
        assert_eq!(sorted[0].message, "a");
        assert_eq!(sorted[1].message, "b");
    }

    #[test]
    fn clear_resets_everything() {
        let interner = Interner::new();
        let mut reporter = Reporter::new();
        reporter.report(Diagnostic::error(ErrorKind::Syntax, "oops", range(&interner, 1)));
        reporter.clear();
        assert!(!reporter.has_errors());
        assert_eq!(reporter.error_count(), 0);
    }
}
