use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ConsoleError, Result};

/// String key-value storage the store persists its collections into
pub trait KeyValueStorage: Send + Sync {
    /// Read a key, `None` if nothing is stored under it
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under a key
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared storage backend type
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// In-process storage, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage keeping each key in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open storage in `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| ConsoleError::StorageWrite {
            path: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConsoleError::StorageRead {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value).map_err(|e| ConsoleError::StorageWrite {
            path: temp_path.display().to_string(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &path).map_err(|e| ConsoleError::StorageWrite {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ConsoleError::StorageWrite {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("tss_users").unwrap(), None);
        storage.set("tss_users", "[]").unwrap();
        assert_eq!(storage.get("tss_users").unwrap().as_deref(), Some("[]"));
        storage.remove("tss_users").unwrap();
        storage.remove("tss_users").unwrap();
        assert_eq!(storage.get("tss_users").unwrap(), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state")).unwrap();

        assert_eq!(storage.get("tss_session").unwrap(), None);

        storage.set("tss_session", r#"{"id":"admin-1"}"#).unwrap();
        assert!(dir.path().join("state/tss_session.json").exists());
        assert!(!dir.path().join("state/tss_session.json.tmp").exists());
        assert_eq!(
            storage.get("tss_session").unwrap().as_deref(),
            Some(r#"{"id":"admin-1"}"#)
        );

        storage.set("tss_session", "{}").unwrap();
        assert_eq!(storage.get("tss_session").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.remove("tss_session").unwrap();
        storage.set("tss_session", "{}").unwrap();
        storage.remove("tss_session").unwrap();
        assert_eq!(storage.get("tss_session").unwrap(), None);
    }
}
