//! Storage layer for ticklist data.
//!
//! This module handles persistence of the record list.
//!
//! ## Layers
//!
//! - [`BlobBackend`] stores raw strings under short keys (files or memory).
//! - [`Persistence`] is what the store talks to: load the ordered list once,
//!   save the full list after every change. It never reports failures back to
//!   the store; problems are logged and swallowed.
//! - [`BlobPersistence`] implements [`Persistence`] by storing the list as a
//!   JSON array under the `todos` key of a backend.
//!
//! ## Location
//!
//! File storage lives at `~/.local/share/ticklist/<dir-hash>/` (platform data
//! directory), one directory per list directory. `TICK_DATA_DIR` replaces the
//! `~/.local/share/ticklist` base.

pub mod backend;

pub use backend::{BlobBackend, FileBackend, MemoryBackend};

use crate::models::Record;
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable overriding the base data directory.
pub const DATA_DIR_ENV: &str = "TICK_DATA_DIR";

/// Key the record list is stored under.
pub const TODOS_KEY: &str = "todos";

/// Collaborator the store loads from and saves to.
///
/// Both operations are infallible by contract: implementations handle their
/// own failures.
pub trait Persistence {
    /// Load the previously saved ordered list, or an empty list.
    fn load(&mut self) -> Vec<Record>;

    /// Persist the full ordered list.
    fn save(&mut self, records: &[Record]);
}

/// [`Persistence`] over a [`BlobBackend`], storing a JSON array.
#[derive(Debug)]
pub struct BlobPersistence<B: BlobBackend> {
    backend: B,
    key: String,
    last_error: Option<String>,
}

impl<B: BlobBackend> BlobPersistence<B> {
    /// Persist under the default `todos` key.
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, TODOS_KEY)
    }

    /// Persist under a custom key.
    pub fn with_key(backend: B, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
            last_error: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Message of the most recent failed save, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn try_save(&mut self, records: &[Record]) -> Result<()> {
        let payload = serde_json::to_string(records)?;
        self.backend.write_blob(&self.key, &payload)
    }

    fn discard_payload(&mut self, reason: &str) {
        tracing::warn!(
            location = %self.backend.location(),
            key = %self.key,
            "Discarding invalid stored list: {}",
            reason
        );
        if let Err(e) = self.backend.remove_blob(&self.key) {
            tracing::warn!("Failed to remove invalid stored list: {}", e);
        }
    }
}

impl BlobPersistence<MemoryBackend> {
    /// Convenience constructor for an unbounded in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: BlobBackend> Persistence for BlobPersistence<B> {
    fn load(&mut self) -> Vec<Record> {
        let payload = match self.backend.read_blob(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read stored list: {}", e);
                return Vec::new();
            }
        };

        let records: Vec<Record> = match serde_json::from_str(&payload) {
            Ok(records) => records,
            Err(e) => {
                self.discard_payload(&e.to_string());
                return Vec::new();
            }
        };

        // Identifiers must stay unique; keep the first occurrence
        let mut seen = HashSet::with_capacity(records.len());
        let before = records.len();
        let records: Vec<Record> = records.into_iter().filter(|r| seen.insert(r.id)).collect();
        if records.len() != before {
            tracing::warn!(
                dropped = before - records.len(),
                "Dropped records with duplicate ids from stored list"
            );
        }

        tracing::debug!(count = records.len(), "Loaded stored list");
        records
    }

    fn save(&mut self, records: &[Record]) {
        match self.try_save(records) {
            Ok(()) => {
                self.last_error = None;
                tracing::debug!(count = records.len(), "Saved list");
            }
            Err(e) => {
                tracing::warn!(location = %self.backend.location(), "Failed to save list: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Get the storage directory for a list directory.
///
/// Uses a hash of the list directory path to create a unique directory under
/// the base data directory (`TICK_DATA_DIR`, or `<data dir>/ticklist`).
pub fn get_storage_dir(list_dir: &Path) -> Result<PathBuf> {
    let base = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_dir()
            .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?
            .join("ticklist"),
    };
    storage_dir_with_base(list_dir, &base)
}

/// Get the storage directory for a list directory under an explicit base.
pub fn storage_dir_with_base(list_dir: &Path, base: &Path) -> Result<PathBuf> {
    let canonical = list_dir
        .canonicalize()
        .map_err(|e| Error::Other(format!("Could not canonicalize list directory: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string_lossy().as_bytes());
    let hash_hex = format!("{:x}", hasher.finalize());

    Ok(base.join(&hash_hex[..12]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::test_utils::TestEnv;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new("Buy milk".to_string(), Some(Priority::High)),
            Record::new("Walk dog".to_string(), None).toggled(),
            Record::new("Write report".to_string(), Some(Priority::Low)),
        ]
    }

    #[test]
    fn test_load_missing_is_empty() {
        let mut persistence = BlobPersistence::in_memory();
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let env = TestEnv::new();
        let records = sample_records();

        let mut persistence = BlobPersistence::new(FileBackend::new(env.data_path()).unwrap());
        persistence.save(&records);
        assert_eq!(persistence.last_error(), None);

        let mut reopened = BlobPersistence::new(FileBackend::new(env.data_path()).unwrap());
        assert_eq!(reopened.load(), records);
    }

    #[test]
    fn test_invalid_payload_is_discarded() {
        let mut backend = MemoryBackend::new();
        backend.write_blob(TODOS_KEY, "{not json").unwrap();

        let mut persistence = BlobPersistence::new(backend);
        assert!(persistence.load().is_empty());
        assert_eq!(persistence.backend().read_blob(TODOS_KEY).unwrap(), None);
    }

    #[test]
    fn test_wrong_shape_payload_is_discarded() {
        let mut backend = MemoryBackend::new();
        backend
            .write_blob(TODOS_KEY, r#"[{"title":"missing fields"}]"#)
            .unwrap();

        let mut persistence = BlobPersistence::new(backend);
        assert!(persistence.load().is_empty());
        assert!(persistence.backend().is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let first = Record::new("first".to_string(), None);
        let mut dup = Record::new("dup".to_string(), None);
        dup.id = first.id;
        let other = Record::new("other".to_string(), None);

        let mut persistence = BlobPersistence::in_memory();
        persistence.save(&[first.clone(), dup, other.clone()]);
        assert_eq!(persistence.load(), vec![first, other]);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut persistence = BlobPersistence::new(MemoryBackend::with_quota(16));
        persistence.save(&sample_records());

        let err = persistence.last_error().unwrap();
        assert!(err.contains("quota exceeded"), "unexpected error: {}", err);

        // The previous (empty) state is what loads back
        assert!(persistence.load().is_empty());

        // A later successful save clears the error
        persistence.save(&[]);
        assert_eq!(persistence.last_error(), None);
    }

    #[test]
    fn test_custom_key() {
        let mut persistence = BlobPersistence::with_key(MemoryBackend::new(), "other");
        persistence.save(&sample_records());
        assert!(persistence.backend().read_blob("other").unwrap().is_some());
        assert!(persistence.backend().read_blob(TODOS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_storage_dir_is_stable_per_directory() {
        let env = TestEnv::new();
        let a = storage_dir_with_base(env.path(), env.data_path()).unwrap();
        let b = storage_dir_with_base(env.path(), env.data_path()).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with(env.data_path()));
        assert_eq!(a.file_name().unwrap().len(), 12);

        let other = TestEnv::new();
        let c = storage_dir_with_base(other.path(), env.data_path()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_storage_dir_requires_existing_directory() {
        let env = TestEnv::new();
        let missing = env.path().join("does-not-exist");
        assert!(storage_dir_with_base(&missing, env.data_path()).is_err());
    }
}
