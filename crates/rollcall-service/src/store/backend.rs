//! Key-value persistence backends for the attendance store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String values stored under string keys, last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` if nothing was ever stored under `key`.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// ## Errors
    /// Returns an error if the value could not be stored.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No stored value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temporary file first, then renames it over the
    /// target so readers never see a half-written value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.data_dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }
}

/// In-process backend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        assert_eq!(store.get("rollcall.occurrences").unwrap(), None);
        store.set("rollcall.occurrences", "[1]").unwrap();
        store.set("rollcall.occurrences", "[1,2]").unwrap();
        assert_eq!(
            store.get("rollcall.occurrences").unwrap().as_deref(),
            Some("[1,2]")
        );
        assert!(dir.path().join("nested/rollcall.occurrences.json").exists());
        assert!(!dir.path().join("nested/rollcall.occurrences.json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        for key in ["", "../escape", ".hidden", "a/b"] {
            assert!(
                matches!(store.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "{key:?}"
            );
        }
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryKeyValueStore::new();
        let handle = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(handle.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(handle.get("missing").unwrap(), None);
    }
}
