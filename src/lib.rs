//! Ticklist - a to-do list library with memoized derived state and a
//! virtualized list view.
//!
//! This library provides the core functionality for the `tick` CLI tool:
//! the record model, the derived-state store, the windowing calculations used
//! to render large lists, and the blob persistence the store saves through.

pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;
#[cfg(feature = "tui")]
pub mod tui;
pub mod window;

pub use models::ValidationError;

/// Environment variable holding log filter directives, e.g. `TICK_LOG=debug`.
pub const LOG_ENV: &str = "TICK_LOG";

/// Version string with build metadata, shown by `tick --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("TICK_GIT_COMMIT"),
    ", built ",
    env!("TICK_BUILD_TIMESTAMP"),
    ")"
);

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::storage::{BlobPersistence, FileBackend};
    use crate::store::TodoStore;

    /// Test environment with an isolated list directory and data directory.
    pub struct TestEnv {
        /// Directory the list belongs to
        pub list_dir: TempDir,
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                list_dir: TempDir::new().unwrap(),
                data_dir: TempDir::new().unwrap(),
            }
        }

        pub fn path(&self) -> &Path {
            self.list_dir.path()
        }

        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Open a file-backed store rooted in the data directory.
        pub fn open_store(&self) -> TodoStore<BlobPersistence<FileBackend>> {
            let backend = FileBackend::new(self.data_path()).unwrap();
            TodoStore::open(BlobPersistence::new(backend))
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for ticklist operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid text: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ticklist operations.
pub type Result<T> = std::result::Result<T, Error>;
