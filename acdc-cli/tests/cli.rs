use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn acdc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_acdc"))
}

fn sample(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("samples")
        .join(relative)
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn compiles_a_file_to_stdout() {
    let output = acdc().arg(sample("passing/basic.ac")).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout_of(&output), "4 sa 0 k 1.5 sb 0 k la p P lb p P");
}

#[test]
fn reads_standard_input() {
    let mut child = acdc()
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"int a; a = 2 * 3; print a;")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "2 3 * sa 0 k la p P");
}

#[test]
fn writes_to_the_output_file() {
    let target = std::env::temp_dir().join(format!("acdc-cli-{}.dc", std::process::id()));
    let output = acdc()
        .arg(sample("passing/division.ac"))
        .arg("-o")
        .arg(&target)
        .output()
        .unwrap();
    let written = fs::read_to_string(&target);
    fs::remove_file(&target).ok();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        written.unwrap().trim_end(),
        "1.0 6 5 k / sb 0 k lb p P 1 6 / sa 0 k la p P la 5 k sb 0 k"
    );
}

#[test]
fn emits_tokens_ast_and_symbols() {
    let tokens = acdc()
        .args(["--emit", "tokens"])
        .arg(sample("passing/basic.ac"))
        .output()
        .unwrap();
    let tokens = stdout_of(&tokens);
    let lines: Vec<_> = tokens.lines().collect();
    assert_eq!(&lines[..3], ["<TYINT,r:1>", "<ID,r:1,a>", "<SEMI,r:1>"]);
    assert_eq!(lines.last(), Some(&"<EOF,r:7>"));

    let ast = acdc()
        .args(["--emit", "ast"])
        .arg(sample("passing/basic.ac"))
        .output()
        .unwrap();
    assert!(stdout_of(&ast).starts_with("[Program:[Decl:INT,[Id:a]][Decl:FLOAT,[Id:b]]"));

    let symbols = acdc()
        .args(["--emit", "symbols"])
        .arg(sample("passing/mixed.ac"))
        .output()
        .unwrap();
    let symbols = stdout_of(&symbols);
    assert!(symbols.contains("FLOAT"), "{symbols}");
    let rows: Vec<Vec<&str>> = symbols
        .lines()
        .skip(2)
        .map(|line| line.split_whitespace().collect())
        .collect();
    assert_eq!(rows, [vec!["f", "FLOAT", "a"], vec!["i", "INT", "b"]]);
}

#[test]
fn semantic_errors_fail_with_the_whole_log() {
    let output = acdc()
        .arg(sample("failing/undeclared.ac"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Variable: variable 'b' is not declared."), "{stderr}");
    assert!(stderr.contains("Variable: variable 'c' is not declared."), "{stderr}");
}

#[test]
fn ast_with_semantic_errors_goes_to_the_output_file() {
    let target = std::env::temp_dir().join(format!("acdc-cli-ast-{}.txt", std::process::id()));
    let output = acdc()
        .args(["--emit", "ast", "-o"])
        .arg(&target)
        .arg(sample("failing/undeclared.ac"))
        .output()
        .unwrap();
    let written = fs::read_to_string(&target);
    fs::remove_file(&target).ok();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "{}", stdout_of(&output));
    assert!(written.unwrap().starts_with("[Program:[Decl:INT,[Id:a]]"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Variable: variable 'b' is not declared."));
}

#[test]
fn syntax_errors_report_the_line() {
    let output = acdc()
        .arg(sample("failing/missing_semicolon.ac"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
}

#[test]
fn missing_input_is_an_error() {
    let output = acdc().arg("does/not/exist.ac").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn usage_errors_exit_with_two() {
    let output = acdc().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let output = acdc().args(["--emit", "bytecode", "x.ac"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
