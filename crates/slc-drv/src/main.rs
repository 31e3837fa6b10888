use std::fs;
use std::process::ExitCode;

use clap::Parser;

use slc_drv::cli::Cli;
use slc_drv::Session;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.to_config();
    let mut session = Session::new(config);

    let mut had_error = false;
    let mut outputs = Vec::new();

    for path in &session.config.input_files.clone() {
        let source = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("slc: error reading {}: {err}", path.display());
                had_error = true;
                continue;
            }
        };

        let filename = path.display().to_string();
        match session.compile(&filename, &source) {
            Ok(ir) => outputs.push(ir),
            Err(err) => {
                for diagnostic in session.reporter.errors() {
                    eprintln!("{diagnostic}");
                }
                eprintln!("slc: {err}");
                had_error = true;
            }
        }

        if session.config.verbose {
            let stats = session.stats();
            eprintln!(
                "slc: {} error(s), {} warning(s), {} interned string(s)",
                stats.errors, stats.warnings, stats.interned_strings
            );
        }
    }

    if had_error {
        return ExitCode::FAILURE;
    }

    if let Some(output_path) = &session.config.output_file {
        let combined = outputs.join("\n");
        if let Err(err) = fs::write(output_path, combined) {
            eprintln!("slc: error writing {}: {err}", output_path.display());
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
