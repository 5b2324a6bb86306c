//! End-to-end driver tests: exit codes, stdout/stderr contracts.

use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn alang() -> Command {
    Command::cargo_bin("alang").expect("binary builds")
}

fn source_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("alang-cli-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("writes source");
    path
}

const HELLO: &str = r#"fun main():nothing { writeString("hello\n"); }"#;

#[test]
fn compiles_file_to_stdout() {
    let src = source_file("hello.alan", HELLO);

    alang()
        .arg("-i")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains("define i32 @main()"))
        .stdout(predicate::str::contains("hello"));
}

#[test]
fn compiles_from_stdin() {
    alang()
        .args(["-f", "-i"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout(predicate::str::contains("define i32 @main()"));
}

#[test]
fn optimization_flag_is_accepted() {
    let src = source_file(
        "sum.alan",
        r#"
fun main():nothing {
    var sum:int;
    var i:int;
    sum <- 0;
    i <- 1;
    while i <= 10 do {
        sum <- sum + i;
        i <- i + 1;
    }
    writeInteger(sum);
}
"#,
    );

    alang()
        .args(["-O", "-i"])
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains("writeInteger"));
}

#[test]
fn writes_ll_file_by_default() {
    let src = source_file("out.alan", HELLO);

    alang().arg(&src).assert().success();

    let out = src.with_extension("ll");
    let ir = fs::read_to_string(&out).expect("output written");
    assert!(ir.contains("define i32 @main()"));
    let _ = fs::remove_file(out);
}

#[test]
fn syntax_error_exits_1() {
    let src = source_file("syn.alan", "fun main():nothing {");

    alang()
        .arg("-i")
        .arg(&src)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn lexical_error_exits_1() {
    let src = source_file("lex.alan", "fun main():nothing { x <- @; }");

    alang()
        .arg("-i")
        .arg(&src)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unexpected character"));
}

#[test]
fn semantic_error_exits_2_with_position() {
    let src = source_file("sem.alan", "fun main():nothing { x <- 1; }");

    alang()
        .arg("-i")
        .arg(&src)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("undeclared name"))
        .stderr(predicate::str::contains(":1:22:"));
}

#[test]
fn missing_input_exits_3() {
    alang()
        .arg("-i")
        .arg("/nonexistent/alang-source.alan")
        .assert()
        .code(3);
}
