//! CLI-level integration tests driving the built `slc` binary end to end,
//! exercising flags, exit codes, and output files rather
//! than `Session::compile` directly.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn slc_bin() -> Command {
    Command::new(PathBuf::from(env!("CARGO_BIN_EXE_slc")))
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write source fixture");
    path
}

#[test]
fn help_flag_prints_usage() {
    let mut cmd = slc_bin();
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_prints_version() {
    let mut cmd = slc_bin();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("slc"));
}

#[test]
fn compiles_single_file_to_default_dot_ll_output() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "main.sl", "func main() -> int { return 0; }");

    let mut cmd = slc_bin();
    cmd.current_dir(dir.path()).arg("-i").arg(&input);
    cmd.assert().success();

    let expected_output = input.with_extension("ll");
    assert!(expected_output.exists(), "expected {:?} to exist", expected_output);
    let ir = std::fs::read_to_string(expected_output).unwrap();
    assert!(ir.contains("define i32 @main("));
}

#[test]
fn explicit_output_path_is_honored() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "main.sl", "func main() -> int { return 0; }");
    let output = dir.path().join("prog.ll");

    let mut cmd = slc_bin();
    cmd.arg("-i").arg(&input).arg("-o").arg(&output);
    cmd.assert().success();
    assert!(output.exists());
}

#[test]
fn compile_error_exits_with_failure_and_no_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.sl", "func main() -> int { return y; }");
    let output = dir.path().join("bad.ll");

    let mut cmd = slc_bin();
    cmd.arg("-i").arg(&input).arg("-o").arg(&output);
    cmd.assert().failure().code(1);
    assert!(!output.exists());
}

#[test]
fn missing_input_file_fails_with_nonzero_exit() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does_not_exist.sl");

    let mut cmd = slc_bin();
    cmd.arg("-i").arg(&missing);
    cmd.assert().failure();
}

#[test]
fn verbose_flag_reports_compile_progress_on_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "main.sl", "func main() -> int { return 0; }");
    let output = dir.path().join("main.ll");

    let mut cmd = slc_bin();
    cmd.arg("-i").arg(&input).arg("-o").arg(&output).arg("-v");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("compiling"));
}

#[test]
fn multiple_inputs_without_explicit_output_default_to_output_dot_ll() {
    let dir = TempDir::new().unwrap();
    let a = write_source(&dir, "a.sl", "func a() -> int { return 1; }");
    let b = write_source(&dir, "b.sl", "func main() -> int { return 2; }");

    let mut cmd = slc_bin();
    cmd.current_dir(dir.path())
        .arg("-i")
        .arg(format!("{},{}", a.display(), b.display()));
    cmd.assert().success();
    assert!(dir.path().join("output.ll").exists());
}
