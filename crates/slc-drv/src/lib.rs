//! The pipeline orchestrator: wires the lexer, parser,
//! analyzer and emitter together behind a single `compile` call, plus
//! the `Config`/`Session` shape the CLI binary drives.
//!
//! ```text
//! source text ──▶ Lexer ──▶ tokens ──▶ Parser ──▶ AST
//!                                                   │
//!                                                   ▼
//!                                              Analyzer ──▶ typed AST
//!                                                               │
//!                                                               ▼
//!                                                          Emitter ──▶ IR text
//! ```
//!
//! Each phase reports into a shared [`Reporter`]; the pipeline checks it
//! after every phase and returns early rather than running a later phase
//! over a program it already knows is broken.

pub mod cli;

use std::path::PathBuf;

use inkwell::context::Context;
use thiserror::Error;

use slc_gen::{CodeGenError, Emitter};
use slc_lex::Lexer;
use slc_par::Parser;
use slc_util::{Pool, Reporter};

/// Everything a single `compile` invocation needs that isn't part of the
/// source text itself: the options the CLI surface exposes.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_files: Vec<PathBuf>,
    pub output_file: Option<PathBuf>,
    /// `-O 0..3`; forwarded into the IR only as a comment. This
    /// compiler runs no optimization passes of its own.
    pub opt_level: u8,
    /// `-g`; forwarded the same way.
    pub debug: bool,
    pub target: String,
    /// `-Werror`.
    pub warnings_as_errors: bool,
    /// `-v`.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            output_file: None,
            opt_level: 0,
            debug: false,
            target: default_target(),
            warnings_as_errors: false,
            verbose: false,
        }
    }
}

/// Error/warning counts plus the memory pool's interning count, exposed
/// between phases as a stats accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub errors: usize,
    pub warnings: usize,
    pub interned_strings: usize,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The reporter holds errors; see [`Session::reporter`] for the
    /// full diagnostic list.
    #[error("compilation failed with {0} error(s)")]
    CompilationFailed(usize),
    #[error("code generation failed: {0}")]
    CodeGen(#[from] CodeGenError),
}

/// One compiler invocation's state: its configuration, the shared string
/// pool, and the diagnostic reporter every phase reports into.
///
/// A fresh [`slc_sem::SymbolTable`] is constructed inside `analyze` on
/// every `compile` call, so there is no persistent symbol-table field
/// here for [`Session::reset`] to empty: each call already starts from
/// an empty one by construction. `reset` only has the reporter and the
/// pool left to clear.
pub struct Session {
    pub config: Config,
    pub pool: Pool,
    pub reporter: Reporter,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config, pool: Pool::new(), reporter: Reporter::new() }
    }

    /// Runs the full pipeline over one source file's text and returns its
    /// LLVM IR, following the lex-parse-check-analyze-check-emit contract
    /// exactly.
    pub fn compile(&mut self, filename: &str, input: &str) -> Result<String, CompileError> {
        self.reporter.clear();

        if self.config.verbose {
            eprintln!("compiling {filename}");
        }

        let lexer = Lexer::new(&self.pool, filename, input);
        let parser = Parser::new(lexer, &mut self.reporter);
        let mut program = parser.parse(&mut self.reporter);
        if self.reporter.has_errors() {
            return Err(CompileError::CompilationFailed(self.reporter.error_count()));
        }

        if self.config.verbose {
            eprintln!("analyzing {filename}");
        }
        let analysis = slc_sem::analyze(&mut program, &self.pool, &mut self.reporter);
        if self.reporter.has_errors() {
            return Err(CompileError::CompilationFailed(self.reporter.error_count()));
        }

        if self.config.warnings_as_errors && self.reporter.has_warnings() {
            self.reporter.promote_warnings_to_errors();
            return Err(CompileError::CompilationFailed(self.reporter.error_count()));
        }

        if self.config.verbose {
            eprintln!("emitting IR for {filename}");
        }
        let context = Context::create();
        let mut emitter = Emitter::new(&context, &self.pool, filename, &self.config.target);
        let ir = emitter.generate(&program, &analysis)?;
        if self.reporter.has_errors() {
            return Err(CompileError::CompilationFailed(self.reporter.error_count()));
        }

        Ok(ir)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            errors: self.reporter.error_count(),
            warnings: self.reporter.warning_count(),
            interned_strings: self.pool.len(),
        }
    }

    /// Clears accumulated diagnostics and releases unused pooled strings.
    pub fn reset(&mut self) {
        self.reporter.clear();
        self.pool.release_all();
    }
}

fn default_target() -> String {
    std::env::var("TARGET").unwrap_or_else(|_| {
        if cfg!(target_os = "linux") {
            "x86_64-unknown-linux-gnu".to_string()
        } else if cfg!(target_os = "macos") {
            "x86_64-apple-darwin".to_string()
        } else if cfg!(target_os = "windows") {
            "x86_64-pc-windows-msvc".to_string()
        } else {
            "x86_64-unknown-unknown".to_string()
        }
    })
}
