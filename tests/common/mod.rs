//! Common test utilities for ticklist integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/ticklist/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates two temporary directories:
/// - `list_dir`: The directory the list belongs to (working directory)
/// - `data_dir`: Holds ticklist's data (via `TICK_DATA_DIR`)
///
/// The `tick()` method returns a `Command` that sets `TICK_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub list_dir: TempDir,
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            list_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tick binary with isolated data directory.
    pub fn tick(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tick"));
        cmd.current_dir(self.list_dir.path());
        cmd.env("TICK_DATA_DIR", self.data_dir.path());
        cmd.env_remove("TICK_DIR");
        cmd.env_remove("TICK_OUTPUT");
        cmd.env_remove("TICK_LOG");
        cmd
    }

    /// Run a command expected to succeed and parse its JSON output.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.tick().args(args).assert().success().get_output().clone();
        serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
            panic!(
                "invalid JSON from {:?}: {}\n{}",
                args,
                e,
                String::from_utf8_lossy(&output.stdout)
            )
        })
    }

    /// Add a record and return its id.
    pub fn add(&self, text: &str) -> String {
        self.json(&["add", text])["id"].as_str().unwrap().to_string()
    }

    pub fn path(&self) -> &std::path::Path {
        self.list_dir.path()
    }

    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
