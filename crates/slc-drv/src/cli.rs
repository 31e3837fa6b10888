//! Command-line argument parsing: a thin, external-facing
//! layer over [`crate::Session`]. None of the core engineering lives
//! here; this just turns `std::env::args()` into a [`crate::Config`]
//! and a list of files to read, keeping the pipeline itself free of any
//! notion of flags, files, or exit codes.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// `slc`: ahead-of-time compiler for the source language, emitting
/// LLVM textual IR.
#[derive(Parser, Debug)]
#[command(name = "slc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles source-language programs to LLVM IR", long_about = None)]
pub struct Cli {
    /// Comma-separated source files to compile.
    #[arg(short = 'i', long = "input", value_delimiter = ',', required = true)]
    pub input: Vec<PathBuf>,

    /// Output file path. Defaults to `<input>.ll` for a single input
    /// file, or `output.ll` for multiple.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Optimization level, forwarded to the IR header only. This
    /// compiler runs no optimization passes of its own.
    #[arg(short = 'O', long = "opt-level", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub opt_level: u8,

    /// Emit debug info (forwarded, not yet acted on by the emitter).
    #[arg(short = 'g', long = "debug")]
    pub debug: bool,

    /// Override the target triple.
    #[arg(long = "target")]
    pub target: Option<String>,

    /// Treat warnings as errors.
    #[arg(long = "werror")]
    pub werror: bool,

    /// Print a stats dump after compilation.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Builds a [`Config`] from parsed arguments, applying the `-o`
    /// default rule: `<input>.ll` for a single file, `output.ll`
    /// otherwise.
    pub fn to_config(&self) -> Config {
        let output_file = self.output.clone().or_else(|| {
            if self.input.len() == 1 {
                Some(self.input[0].with_extension("ll"))
            } else {
                Some(PathBuf::from("output.ll"))
            }
        });

        Config {
            input_files: self.input.clone(),
            output_file,
            opt_level: self.opt_level,
            debug: self.debug,
            target: self.target.clone().unwrap_or_else(crate::default_target),
            warnings_as_errors: self.werror,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_inputs() {
        let cli = Cli::parse_from(["slc", "-i", "a.sl,b.sl"]);
        assert_eq!(cli.input, vec![PathBuf::from("a.sl"), PathBuf::from("b.sl")]);
    }

    #[test]
    fn single_input_defaults_output_to_dot_ll() {
        let cli = Cli::parse_from(["slc", "-i", "main.sl"]);
        let config = cli.to_config();
        assert_eq!(config.output_file, Some(PathBuf::from("main.ll")));
    }

    #[test]
    fn multi_input_defaults_output_to_output_ll() {
        let cli = Cli::parse_from(["slc", "-i", "a.sl,b.sl"]);
        let config = cli.to_config();
        assert_eq!(config.output_file, Some(PathBuf::from("output.ll")));
    }

    #[test]
    fn explicit_output_overrides_default() {
        let cli = Cli::parse_from(["slc", "-i", "main.sl", "-o", "prog.ll"]);
        let config = cli.to_config();
        assert_eq!(config.output_file, Some(PathBuf::from("prog.ll")));
    }

    #[test]
    fn werror_flag_sets_warnings_as_errors() {
        let cli = Cli::parse_from(["slc", "-i", "main.sl", "--werror"]);
        assert!(cli.to_config().warnings_as_errors);
    }

    #[test]
    fn opt_level_out_of_range_is_rejected() {
        let result = Cli::try_parse_from(["slc", "-i", "main.sl", "-O", "9"]);
        assert!(result.is_err());
    }
}
