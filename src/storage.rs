use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::info;

use crate::error::StorageError;

/// Minimal string key-value persistence.
///
/// The history layer is written against this trait so the same logic can
/// target any persistent store; production uses [`FileStorage`], tests use
/// [`MemoryStorage`].
pub trait Storage {
    /// Read the value for a key, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Write the value for a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one file per key under a data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("Opened file storage at {:?}", dir);
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests and ephemeral use. `poison` makes every write
/// fail, standing in for quota-exceeded and storage-denied conditions.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    poisoned: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with the given message.
    pub fn poison(&self, reason: &str) {
        *self.poisoned.lock().unwrap() = Some(reason.to_string());
    }

    fn check_poisoned(&self) -> Result<(), StorageError> {
        match self.poisoned.lock().unwrap().as_ref() {
            Some(reason) => Err(StorageError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_poisoned()?;
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_poisoned()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert_eq!(storage.get("history").unwrap(), None);
        storage.set("history", "[1,2,3]").unwrap();
        assert_eq!(storage.get("history").unwrap(), Some("[1,2,3]".to_string()));

        storage.set("history", "[]").unwrap();
        assert_eq!(storage.get("history").unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_file_storage_remove() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.set("history", "[]").unwrap();
        storage.remove("history").unwrap();
        assert_eq!(storage.get("history").unwrap(), None);

        // Removing an absent key is fine
        storage.remove("history").unwrap();
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("spendlens");
        let storage = FileStorage::new(&nested).unwrap();
        storage.set("history", "[]").unwrap();
        assert!(nested.join("history.json").exists());
    }

    #[test]
    fn test_file_storage_keys_are_independent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.get("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_poisoned_memory_storage_fails_writes_but_not_reads() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").unwrap();
        storage.poison("quota exceeded");

        assert!(matches!(
            storage.set("k", "w"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.remove("k").is_err());
        // Reads still serve the last good value
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
    }
}
