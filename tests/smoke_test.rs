//! Smoke tests for the tick CLI.
//!
//! These tests verify basic CLI functionality:
//! - `tick --version` outputs version info
//! - `tick --help` outputs help text
//! - `tick` (no args) lists the current directory's records as JSON

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    TestEnv::new()
        .tick()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tick"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    TestEnv::new()
        .tick()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("window"));
}

#[test]
fn test_no_args_lists_as_json() {
    let env = TestEnv::new();
    let out = env.json(&[]);
    assert_eq!(out["filter"], "all");
    assert_eq!(out["count"], 0);
}

#[test]
fn test_invalid_command() {
    TestEnv::new()
        .tick()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_list_dir_is_an_error() {
    let env = TestEnv::new();
    let missing = env.path().join("nope");
    env.tick()
        .args(["-C", missing.to_str().unwrap(), "stats"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("does not exist"));
}
