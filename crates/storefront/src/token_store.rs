//! Persistent slot for the bearer token.
//!
//! The browser build kept the token in `localStorage["token"]`. Here the
//! same key/value shape lives in a small JSON file; only one key is ever
//! written by this crate.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use grayshop_core::BearerToken;
use thiserror::Error;

/// Errors raised by token storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage file exists but is not a JSON object of strings.
    #[error("{path}: corrupt storage file: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Storage for the single bearer credential.
///
/// Implementations must be cheap to call; the API client reads the token
/// before every request.
pub trait TokenStore: Send + Sync {
    /// The stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be read.
    fn get(&self) -> Result<Option<BearerToken>, StorageError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn set(&self, token: &BearerToken) -> Result<(), StorageError>;

    /// Remove the stored token. Clearing an empty store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// File-backed store
// =============================================================================

/// Token store backed by a JSON object file (`{"token": "..."}`).
///
/// Other keys in the file are preserved. The file is rewritten whole on
/// every change; parent directories are created on first write.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    /// Create a store reading `key` from the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, body).map_err(io_err)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<BearerToken>, StorageError> {
        let mut entries = self.read_all()?;
        Ok(entries.remove(&self.key).and_then(BearerToken::new))
    }

    fn set(&self, token: &BearerToken) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(self.key.clone(), token.expose().to_string());
        self.write_all(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(&self.key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<BearerToken>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`.
    #[must_use]
    pub fn with_token(token: BearerToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<BearerToken>, StorageError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn set(&self, token: &BearerToken) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token(raw: &str) -> BearerToken {
        BearerToken::new(raw).unwrap()
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("storage.json"), "token");
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_file_store_set_get_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/storage.json");
        let store = FileTokenStore::new(&path, "token");

        store.set(&token("jwt-1")).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "jwt-1");

        // A second handle on the same file sees the write.
        let other = FileTokenStore::new(&path, "token");
        assert_eq!(other.get().unwrap().unwrap().expose(), "jwt-1");

        store.clear().unwrap();
        assert!(other.get().unwrap().is_none());
    }

    #[test]
    fn test_file_store_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"gray"}"#).unwrap();

        let store = FileTokenStore::new(&path, "token");
        store.set(&token("jwt")).unwrap();
        store.clear().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\""));
        assert!(!raw.contains("jwt"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path, "token");
        assert!(matches!(
            store.get(),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_file_store_blank_token_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"token":""}"#).unwrap();

        let store = FileTokenStore::new(&path, "token");
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert!(store.get().unwrap().is_none());
        store.set(&token("abc")).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "abc");
        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }
}
