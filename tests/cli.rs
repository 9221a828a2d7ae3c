//! Command-line tests: run the `packlayout` binary on schema files.

use std::io::Write;
use std::process::{Command, Output};

const SCHEMA: &str = r#"
param T, Tx;
struct Header {
	kind: uint8;
	len: uint16;
}
struct Templated {
	header: Header;
	value: T;
	samples: float32[Tx];
}
let Concrete = Templated % { T: int32, Tx: 4 };
"#;

fn run(args: &[&str], stdin: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_packlayout"));
    cmd.args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped());
    let mut child = cmd.spawn().expect("spawn packlayout");
    {
        let mut pipe = child.stdin.take().expect("stdin");
        pipe.write_all(stdin.unwrap_or("").as_bytes()).expect("write stdin");
    }
    child.wait_with_output().expect("wait")
}

fn schema_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(contents.as_bytes()).expect("write schema");
    f
}

#[test]
fn prints_tokens_for_file() {
    let file = schema_file(SCHEMA);
    let path = file.path().to_str().expect("utf-8 path");
    let out = run(&[path], None);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Header: BH (3 bytes)",
            "Templated: template <T, Tx>",
            "Concrete: BHi4f (23 bytes)",
        ]
    );
}

#[test]
fn reads_stdin_when_no_files() {
    let out = run(&[], Some("struct S { a: int32; b: byte[3]; }"));
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "S: i3s (7 bytes)");
}

#[test]
fn human_output_includes_layout_table() {
    let file = schema_file(SCHEMA);
    let path = file.path().to_str().expect("utf-8 path");
    let out = run(&["--human", path], None);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("header.len: uint16 [H]"), "stdout: {}", stdout);
    assert!(stdout.contains("samples: float32[4] [4f]"), "stdout: {}", stdout);
    assert!(stdout.contains("<template: T, Tx>"), "stdout: {}", stdout);
}

#[test]
fn parse_error_exits_nonzero() {
    let file = schema_file("param T;\nstruct S { a: int32[T]; }\nstruct P { s: S; }\n");
    let path = file.path().to_str().expect("utf-8 path");
    let out = run(&[path], None);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 3"), "stderr: {}", stderr);
    assert!(stderr.contains("unspecified template"), "stderr: {}", stderr);
}

#[test]
fn missing_file_exits_nonzero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.pl");
    let out = run(&[missing.to_str().expect("utf-8 path")], None);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn oversized_struct_array_is_an_error_not_a_crash() {
    let src = "struct I { a: int32; b: int32; c: int32; d: int32; }\nstruct Big { items: I[4611686018427387904]; }\n";
    let out = run(&[], Some(src));
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 2"), "stderr: {}", stderr);
    assert!(stderr.contains("token string is too large"), "stderr: {}", stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
}

#[test]
fn oversized_primitive_array_keeps_exact_count() {
    let out = run(&["--human"], Some("struct S { a: int8[4294967296][4294967297]; }"));
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "S: 18446744078004518912b (size overflows usize)",
            "  <S: packed size is too large>",
        ]
    );
}

#[test]
fn deep_nesting_is_a_parse_error() {
    let src = format!("struct S {{ a: {}int8{}; }}", "(".repeat(5000), ")".repeat(5000));
    let out = run(&[], Some(&src));
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("nesting deeper than"));
}
