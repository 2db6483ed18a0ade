//! Session storage: where the persisted auth entry lives between runs.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;

/// Errors from a [`SessionStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session entry could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("session storage lock poisoned")]
    Poisoned,
}

/// A key/value store of JSON strings, scoped to one user session.
pub trait SessionStorage: Send + Sync {
    /// Read an entry; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Create or replace an entry.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete an entry. Deleting a missing entry is not an error.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a private directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `key`. Path separators in keys are flattened.
    #[must_use]
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.entry_path(key);
        fs::write(&path, value.as_bytes()).map_err(io_error(&path))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .map_err(io_error(&path))?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(storage: &dyn SessionStorage) {
        assert_eq!(storage.load("ai-healthpal-auth").unwrap(), None);

        storage.save("ai-healthpal-auth", r#"{"a":1}"#).unwrap();
        assert_eq!(
            storage.load("ai-healthpal-auth").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );

        storage.save("ai-healthpal-auth", r#"{"a":2}"#).unwrap();
        assert_eq!(
            storage.load("ai-healthpal-auth").unwrap().as_deref(),
            Some(r#"{"a":2}"#)
        );

        storage.remove("ai-healthpal-auth").unwrap();
        assert_eq!(storage.load("ai-healthpal-auth").unwrap(), None);
        storage.remove("ai-healthpal-auth").unwrap();
    }

    #[test]
    fn memory_storage_contract() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn file_storage_contract() {
        let dir = TempDir::new().unwrap();
        exercise(&FileStorage::new(dir.path().join("nested")));
    }

    #[test]
    fn file_storage_flattens_separators() {
        let storage = FileStorage::new("/tmp/hp");
        assert_eq!(
            storage.entry_path("../escape"),
            PathBuf::from("/tmp/hp/.._escape.json")
        );
    }

    #[cfg(unix)]
    #[test]
    fn file_storage_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("k", "{}").unwrap();
        let mode = fs::metadata(storage.entry_path("k"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
