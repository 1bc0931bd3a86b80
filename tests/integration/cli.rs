mod common;

use std::path::{Path, PathBuf};
use std::process::Output;

use capsule::ast::*;
use common::*;
use tempfile::TempDir;

/// A project directory with `program.json` and a `.git` marker so config discovery stops here.
fn project(program: &Program) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    let file = dir.path().join("program.json");
    std::fs::write(&file, serde_json::to_string_pretty(program).unwrap()).unwrap();
    (dir, file)
}

fn run(args: &[&str], file: &Path) -> Output {
    capsule().args(args).arg(file).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn lambda_program() -> Program {
    program(vec![foo(
        vec![Param::new("x", u32())],
        Expr::lambda(lambda(None, vec![], vec![CaptureSpec::implicit("x")], Expr::ident("x"))),
    )])
}

fn broken_program() -> Program {
    program(vec![foo(vec![], Expr::ident("missing").at(capsule::span::Span::new(0, 7)))])
}

#[test]
fn expand_prints_desugared_program() {
    let (_dir, file) = project(&lambda_program());
    let output = run(&["expand"], &file);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("class Foo"), "got:\n{out}");
    assert!(out.contains("fun apply()"), "got:\n{out}");
    assert!(!out.contains("lambda"), "lambda should be gone:\n{out}");
}

#[test]
fn expand_json_round_trips_through_the_reader() {
    let (_dir, file) = project(&lambda_program());
    let output = run(&["expand", "--format", "json"], &file);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let program = capsule::parse_program(&stdout(&output)).unwrap();
    let body = program.decl("Foo").and_then(|d| d.method("f")).and_then(|m| m.body.as_ref()).unwrap();
    assert!(matches!(body.kind, ExprKind::ObjectInit { .. }));
}

#[test]
fn verbose_lists_generated_declarations() {
    let (_dir, file) = project(&lambda_program());
    let output = run(&["expand", "-v"], &file);
    assert!(output.status.success());

    let err = stderr(&output);
    assert!(err.contains("generated $1 (inline)"), "got:\n{err}");
    assert!(err.contains("1 declaration(s) generated"), "got:\n{err}");
}

#[test]
fn check_reports_ok() {
    let (_dir, file) = project(&lambda_program());
    let output = run(&["check"], &file);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("ok (1 declaration(s) generated)"));
}

#[test]
fn errors_exit_nonzero_with_filename() {
    let (_dir, file) = project(&broken_program());
    let output = run(&["check"], &file);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.contains("error ["), "got:\n{err}");
    assert!(err.contains("unknown name 'missing'"), "got:\n{err}");
}

#[test]
fn source_text_gives_labelled_report() {
    let (dir, file) = project(&broken_program());
    let source = dir.path().join("program.src");
    std::fs::write(&source, "missing\n").unwrap();

    let output = capsule().arg("check").arg(&file).arg("--source").arg(&source).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("unresolved reference"), "got:\n{err}");
    assert!(err.contains("unknown name 'missing'"), "got:\n{err}");
}

#[test]
fn discovered_config_selects_json() {
    let (dir, file) = project(&lambda_program());
    std::fs::write(dir.path().join("capsule.toml"), "[output]\nformat = \"json\"\n").unwrap();

    let output = run(&["expand"], &file);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(capsule::parse_program(&stdout(&output)).is_ok());
}

#[test]
fn flag_overrides_config() {
    let (dir, file) = project(&lambda_program());
    std::fs::write(dir.path().join("capsule.toml"), "[output]\nformat = \"json\"\n").unwrap();

    let output = run(&["expand", "--format", "pretty"], &file);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("class Foo"));
}

#[test]
fn explicit_config_path() {
    let (dir, file) = project(&lambda_program());
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[desugar]\nverbose = true\n").unwrap();

    let output = capsule().arg("--config").arg(&config).arg("expand").arg(&file).output().unwrap();
    assert!(output.status.success());
    assert!(stderr(&output).contains("generated $1 (inline)"));
}

#[test]
fn invalid_config_fails() {
    let (dir, file) = project(&lambda_program());
    std::fs::write(dir.path().join("capsule.toml"), "[output]\nformat = \"xml\"\n").unwrap();

    let output = run(&["expand"], &file);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Config error: capsule.toml: invalid syntax"));
}

#[test]
fn malformed_program_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    let file = dir.path().join("program.json");
    std::fs::write(&file, "{ not json").unwrap();

    let output = run(&["check"], &file);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid program"));
}
