//! Integration tests for record commands via CLI.
//!
//! These tests verify that:
//! - `tick add/toggle/rm/edit/clear-completed` change the stored list
//! - `tick list/stats` report the derived views
//! - Records persist between invocations, per directory
//! - JSON and human-readable output formats are correct

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_add_then_list() {
    let env = TestEnv::new();
    let out = env.json(&["add", "  Buy milk  ", "-p", "high"]);
    assert_eq!(out["text"], "Buy milk");
    assert_eq!(out["priority"], "high");

    let list = env.json(&["list"]);
    assert_eq!(list["count"], 1);
    assert_eq!(list["records"][0]["text"], "Buy milk");
    assert_eq!(list["records"][0]["completed"], false);
    assert_eq!(list["records"][0]["id"], out["id"]);
}

#[test]
fn test_stats_scenario() {
    let env = TestEnv::new();
    let id = env.add("Buy milk");

    let stats = env.json(&["stats"]);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["active"], 1);
    assert_eq!(stats["completed"], 0);
    assert_eq!(stats["completion_rate"], 0.0);

    env.json(&["toggle", &id]);
    let stats = env.json(&["stats"]);
    assert_eq!(stats["active"], 0);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["completion_rate"], 100.0);

    let cleared = env.json(&["clear-completed"]);
    assert_eq!(cleared["removed"], 1);
    let stats = env.json(&["stats"]);
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["completion_rate"], 0.0);
}

#[test]
fn test_completion_rate_rounds_to_one_decimal() {
    let env = TestEnv::new();
    let first = env.add("a");
    env.add("b");
    env.add("c");
    env.json(&["toggle", &first]);

    let stats = env.json(&["stats"]);
    assert_eq!(stats["completion_rate"], 33.3);
}

#[test]
fn test_add_rejects_invalid_text() {
    let env = TestEnv::new();

    env.tick()
        .args(["add", "   "])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("text must not be empty"));

    let long = "x".repeat(201);
    env.tick()
        .args(["add", &long])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at most 200"));

    assert_eq!(env.json(&["stats"])["total"], 0);
}

#[test]
fn test_add_accepts_max_length() {
    let env = TestEnv::new();
    env.add(&"x".repeat(200));
    assert_eq!(env.json(&["stats"])["total"], 1);
}

#[test]
fn test_filters() {
    let env = TestEnv::new();
    let done = env.add("done one");
    env.add("open one");
    env.json(&["toggle", &done]);

    let active = env.json(&["list", "--filter", "active"]);
    assert_eq!(active["filter"], "active");
    assert_eq!(active["count"], 1);
    assert_eq!(active["records"][0]["text"], "open one");

    let completed = env.json(&["list", "-f", "completed"]);
    assert_eq!(completed["count"], 1);
    assert_eq!(completed["records"][0]["text"], "done one");

    assert_eq!(env.json(&["list", "-f", "all"])["count"], 2);
}

#[test]
fn test_toggle_by_prefix() {
    let env = TestEnv::new();
    let id = env.add("Walk dog");

    let out = env.json(&["toggle", &id[..8]]);
    assert_eq!(out["changed"], true);
    assert_eq!(out["id"], id.as_str());

    // Toggling twice restores the flag
    env.json(&["toggle", &id]);
    assert_eq!(env.json(&["list"])["records"][0]["completed"], false);
}

#[test]
fn test_unknown_id_is_a_noop() {
    let env = TestEnv::new();
    env.add("Keep me");

    for args in [
        vec!["toggle", "00000000-0000-0000-0000-000000000000"],
        vec!["rm", "zzzz"],
        vec!["edit", "abc", "new text"],
    ] {
        let out = env.json(&args);
        assert_eq!(out["changed"], false, "args: {:?}", args);
    }

    let list = env.json(&["list"]);
    assert_eq!(list["count"], 1);
    assert_eq!(list["records"][0]["text"], "Keep me");
    assert_eq!(list["records"][0]["completed"], false);
}

#[test]
fn test_edit_keeps_identity() {
    let env = TestEnv::new();
    let id = env.add("Old text");
    env.json(&["toggle", &id]);
    let before = env.json(&["list"])["records"][0].clone();

    let out = env.json(&["edit", &id, "  New text "]);
    assert_eq!(out["changed"], true);

    let after = env.json(&["list"])["records"][0].clone();
    assert_eq!(after["text"], "New text");
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["completed"], true);
    assert_eq!(after["created_at"], before["created_at"]);
}

#[test]
fn test_edit_rejects_blank_text() {
    let env = TestEnv::new();
    let id = env.add("Keep");
    env.tick()
        .args(["edit", &id, ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("text must not be empty"));
    assert_eq!(env.json(&["list"])["records"][0]["text"], "Keep");
}

#[test]
fn test_rm_preserves_order() {
    let env = TestEnv::new();
    env.add("one");
    let two = env.add("two");
    env.add("three");

    assert_eq!(env.json(&["rm", &two])["changed"], true);

    let list = env.json(&["list"]);
    let texts: Vec<_> = list["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, ["one", "three"]);
}

#[test]
fn test_lists_are_per_directory() {
    let env = TestEnv::new();
    env.add("here");

    let other = TestEnv::new();
    // Same data dir, different list dir
    let out = other
        .tick()
        .env("TICK_DATA_DIR", env.data_path())
        .arg("stats")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stats: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(stats["total"], 0);

    // -C points at the first list
    let out = other
        .tick()
        .env("TICK_DATA_DIR", env.data_path())
        .args(["-C", env.path().to_str().unwrap(), "stats"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stats: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(stats["total"], 1);
}

#[test]
fn test_corrupt_storage_starts_empty() {
    let env = TestEnv::new();
    env.add("will be lost");

    // Overwrite the stored list with garbage
    let dir = std::fs::read_dir(env.data_path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    std::fs::write(dir.join("todos.json"), "{ not json").unwrap();

    assert_eq!(env.json(&["stats"])["total"], 0);
    env.add("fresh");
    assert_eq!(env.json(&["stats"])["total"], 1);
}

#[test]
fn test_human_output() {
    let env = TestEnv::new();
    env.tick()
        .args(["-H", "add", "Buy milk", "-p", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added"))
        .stdout(predicate::str::contains("Buy milk"));

    env.tick()
        .args(["-H", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ]"))
        .stdout(predicate::str::contains("Buy milk (high)"));

    env.tick()
        .args(["-H", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 total, 1 active, 0 completed (0.0% done)"));

    env.tick()
        .args(["-H", "toggle", "nothing-here"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No record matches"));
}

#[test]
fn test_human_errors() {
    let env = TestEnv::new();
    env.tick()
        .args(["-H", "add", ""])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_output_format_from_env() {
    let env = TestEnv::new();
    env.add("x");
    env.tick()
        .env("TICK_OUTPUT", "human")
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 total"));
}
