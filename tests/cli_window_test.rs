//! Integration tests for `tick window`.
//!
//! The window command prints the slice of the filtered list a viewport of
//! the given geometry would materialize, plus the total scroll extent.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::Value;

fn env_with(n: usize) -> TestEnv {
    let env = TestEnv::new();
    for i in 0..n {
        env.add(&format!("item {}", i));
    }
    env
}

fn indices(out: &Value) -> Vec<u64> {
    out["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["index"].as_u64().unwrap())
        .collect()
}

#[test]
fn test_window_defaults() {
    let env = env_with(30);
    let out = env.json(&["window"]);

    // 80px items in a 600px viewport with overscan 5
    assert_eq!(out["item_size"], 80.0);
    assert_eq!(out["viewport_size"], 600.0);
    assert_eq!(out["overscan"], 5);
    assert_eq!(out["total_extent"], 2400.0);
    assert_eq!(out["start_index"], 0);
    assert_eq!(out["end_index"], 13);
    assert_eq!(indices(&out), (0..=13).collect::<Vec<_>>());
    assert_eq!(out["items"][3]["offset"], 240.0);
    assert_eq!(out["items"][3]["text"], "item 3");
}

#[test]
fn test_window_scrolled() {
    let env = env_with(40);
    let out = env.json(&[
        "window",
        "--scroll",
        "400",
        "--viewport",
        "100",
        "--item-size",
        "50",
        "--overscan",
        "1",
    ]);
    // floor(400/50) = 8 and ceil(500/50) = 10, widened by one each side
    assert_eq!(out["start_index"], 7);
    assert_eq!(out["end_index"], 11);
    assert_eq!(out["scroll_offset"], 400.0);
    assert_eq!(out["total_extent"], 2000.0);
}

#[test]
fn test_window_scroll_is_clamped() {
    let env = env_with(10);
    let out = env.json(&[
        "window",
        "--scroll",
        "99999",
        "--viewport",
        "200",
        "--item-size",
        "100",
        "--overscan",
        "0",
    ]);
    assert_eq!(out["scroll_offset"], 800.0);
    assert_eq!(out["start_index"], 8);
    assert_eq!(out["end_index"], 9);

    let out = env.json(&[
        "window",
        "--scroll",
        "-50",
        "--viewport",
        "200",
        "--item-size",
        "100",
        "--overscan",
        "0",
    ]);
    assert_eq!(out["scroll_offset"], 0.0);
    assert_eq!(out["start_index"], 0);
}

#[test]
fn test_window_respects_filter() {
    let env = env_with(4);
    let list = env.json(&["list"]);
    let second = list["records"][1]["id"].as_str().unwrap().to_string();
    env.json(&["toggle", &second]);

    let out = env.json(&["window", "--filter", "completed"]);
    assert_eq!(out["filter"], "completed");
    assert_eq!(out["item_count"], 1);
    assert_eq!(out["items"][0]["text"], "item 1");
    // Indices are positions in the filtered view
    assert_eq!(out["items"][0]["index"], 0);
}

#[test]
fn test_window_empty_list() {
    let env = TestEnv::new();
    let out = env.json(&["window"]);
    assert_eq!(out["item_count"], 0);
    assert_eq!(out["total_extent"], 0.0);
    assert!(out.get("start_index").is_none());
    assert_eq!(out["items"].as_array().unwrap().len(), 0);
}

#[test]
fn test_window_uses_configured_geometry() {
    let env = env_with(20);
    env.json(&["config", "set", "item-size", "10"]);
    env.json(&["config", "set", "viewport-size", "30"]);
    env.json(&["config", "set", "overscan", "0"]);

    let out = env.json(&["window", "--scroll", "50"]);
    assert_eq!(out["start_index"], 5);
    assert_eq!(out["end_index"], 8);

    // Flags beat the config
    let out = env.json(&["window", "--scroll", "50", "--overscan", "2"]);
    assert_eq!(out["start_index"], 3);
    assert_eq!(out["end_index"], 10);
}

#[test]
fn test_window_human_output() {
    let env = env_with(3);
    env.tick()
        .args(["-H", "window"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Items 0-2 of 3"))
        .stdout(predicate::str::contains("item 2"));
}
