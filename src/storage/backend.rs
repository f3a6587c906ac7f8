//! Storage backend trait and implementations.
//!
//! This module provides the raw key-value blob stores the persistence layer
//! writes through:
//! - `FileBackend` - One JSON file per key in a data directory (default)
//! - `MemoryBackend` - In-process map with an optional byte quota

use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for storage backends that handle raw blob persistence.
///
/// A blob is a whole serialized value stored under a short key. Backends
/// replace blobs wholesale; there is no append or partial update.
pub trait BlobBackend {
    /// Read the blob stored under `key`, or `None` if there is none.
    fn read_blob(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any existing blob.
    fn write_blob(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete the blob stored under `key`. Deleting a missing blob is not an error.
    fn remove_blob(&mut self, key: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;
}

/// Blob storage backed by files in a single directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open a file backend rooted at `root`, creating the directory if needed.
    pub fn new(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Path of the file holding `key`.
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobBackend for FileBackend {
    fn read_blob(&self, key: &str) -> Result<Option<String>> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write_blob(&mut self, key: &str, value: &str) -> Result<()> {
        // Write to a sibling temp file first so a crash never leaves a torn blob
        let path = self.blob_path(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_blob(&mut self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        "file"
    }
}

/// Blob storage held in memory.
///
/// An optional quota bounds the total number of bytes across all blobs,
/// which mimics browser-style storage limits.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Create an empty, unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that rejects writes past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            blobs: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.blobs.values().map(String::len).sum()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobBackend for MemoryBackend {
    fn read_blob(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write_blob(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            let existing = self.blobs.get(key).map_or(0, String::len);
            let needed = self.used_bytes() - existing + value.len();
            if needed > quota {
                return Err(Error::QuotaExceeded { needed, quota });
            }
        }
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_blob(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp.path()).unwrap();

        assert_eq!(backend.read_blob("todos").unwrap(), None);
        backend.write_blob("todos", "[]").unwrap();
        assert_eq!(backend.read_blob("todos").unwrap().as_deref(), Some("[]"));
        assert!(backend.blob_path("todos").exists());

        backend.write_blob("todos", "[1]").unwrap();
        assert_eq!(backend.read_blob("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_backend_remove() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp.path()).unwrap();

        backend.write_blob("todos", "[]").unwrap();
        backend.remove_blob("todos").unwrap();
        assert_eq!(backend.read_blob("todos").unwrap(), None);

        // Removing again is fine
        backend.remove_blob("todos").unwrap();
    }

    #[test]
    fn test_file_backend_creates_root() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let backend = FileBackend::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(backend.backend_type(), "file");
        assert_eq!(backend.location(), nested.display().to_string());
    }

    #[test]
    fn test_memory_backend_roundtrip() {
        let mut backend = MemoryBackend::new();
        assert!(backend.is_empty());
        backend.write_blob("k", "value").unwrap();
        assert_eq!(backend.read_blob("k").unwrap().as_deref(), Some("value"));
        assert_eq!(backend.used_bytes(), 5);
        backend.remove_blob("k").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_memory_backend_quota() {
        let mut backend = MemoryBackend::with_quota(8);
        backend.write_blob("k", "12345678").unwrap();

        // Replacing a blob only counts the new size
        backend.write_blob("k", "1234").unwrap();

        let err = backend.write_blob("other", "123456").unwrap_err();
        assert!(matches!(
            err,
            Error::QuotaExceeded {
                needed: 10,
                quota: 8
            }
        ));
        assert_eq!(backend.read_blob("other").unwrap(), None);
    }
}
