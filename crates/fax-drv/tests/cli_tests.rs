//! End-to-end CLI tests (§6.2): drive the built `fax` binary the way a
//! user would from a shell, rather than calling `fax_drv::run` in
//! process. Mirrors the teacher's own `tests/` layout of one file per
//! concern plus a `fixtures/` directory of real source files.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fax_bin() -> Command {
    Command::cargo_bin("fax").expect("fax binary is built by this workspace")
}

#[test]
fn help_mentions_usage() {
    let mut cmd = fax_bin();
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_matches_crate_version() {
    let mut cmd = fax_bin();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_mode_flag_is_a_usage_error() {
    let mut cmd = fax_bin();
    cmd.arg("--input").arg(fixtures_dir().join("hello_world.lang"));
    cmd.assert().failure();
}

#[test]
fn test_mode_runs_the_embedded_suite() {
    let mut cmd = fax_bin();
    cmd.arg("--test");
    cmd.assert().success().stdout(predicate::str::contains("PASS"));
}

#[test]
fn exec_mode_prints_hello() {
    let mut cmd = fax_bin();
    cmd.arg("--exec").arg("--input").arg(fixtures_dir().join("hello_world.lang"));
    cmd.assert().success().stdout(predicate::eq("hello\n"));
}

#[test]
fn exec_mode_evaluates_arithmetic_precedence() {
    let mut cmd = fax_bin();
    cmd.arg("--exec").arg("--input").arg(fixtures_dir().join("arithmetic.lang"));
    cmd.assert().success().stdout(predicate::eq("7\n"));
}

#[test]
fn exec_mode_on_missing_file_fails() {
    let mut cmd = fax_bin();
    cmd.arg("--exec").arg("--input").arg(fixtures_dir().join("does_not_exist.lang"));
    cmd.assert().failure();
}

#[test]
fn lex_dump_json_emits_token_array() {
    let mut cmd = fax_bin();
    cmd.arg("--lex")
        .arg("--dump-json")
        .arg("--input")
        .arg(fixtures_dir().join("hello_world.lang"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"type_string\""))
        .stdout(predicate::str::contains("FUNCTION"));
}

#[test]
fn parse_dump_json_emits_ast() {
    let mut cmd = fax_bin();
    cmd.arg("--parse")
        .arg("--dump-json")
        .arg("--input")
        .arg(fixtures_dir().join("arithmetic.lang"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("TOP_LEVEL"))
        .stdout(predicate::str::contains("BINARY_OP"));
}

#[test]
fn comp_mode_emits_c_source_against_the_runtime_abi() {
    let mut cmd = fax_bin();
    cmd.arg("--comp").arg("--input").arg(fixtures_dir().join("hello_world.lang"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#include \"runtime.h\""))
        .stdout(predicate::str::contains("L528_main"));
}

#[test]
fn comp_e2e_without_output_is_a_usage_error() {
    let mut cmd = fax_bin();
    cmd.arg("--comp-e2e").arg("--input").arg(fixtures_dir().join("hello_world.lang"));
    cmd.assert().failure();
}

#[test]
fn two_mode_flags_is_a_usage_error() {
    let mut cmd = fax_bin();
    cmd.arg("--lex")
        .arg("--parse")
        .arg("--input")
        .arg(fixtures_dir().join("hello_world.lang"));
    cmd.assert().failure();
}
