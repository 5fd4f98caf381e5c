//! Local key-value snapshot storage.
//!
//! The storefront persists exactly two things locally: the cart line list and
//! the last shipping form. Both are opportunistic. A failed read is treated
//! as "nothing saved", and callers log and ignore a failed write.
//!
//! [`FileStore`] keeps one JSON file per key under a data directory and is
//! what the CLI session uses. [`MemoryStore`] backs tests and ephemeral
//! sessions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage key for the serialized cart line list.
pub const CART_KEY: &str = "streetslipp_cart";

/// Storage key for the last submitted shipping form.
pub const SHIPPING_INFO_KEY: &str = "streetslipp_shipping_info";

/// Errors that can occur when writing a snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key contains characters that are not allowed in a file name.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string-valued key-value store with a single writer.
pub trait SnapshotStore: Send + Sync {
    /// Read the raw value for `key`, or `None` if absent or unreadable.
    fn load(&self, key: &str) -> Option<String>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value could not be written.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Load and deserialize a JSON snapshot.
///
/// Absent or corrupt data yields `None`; corruption is logged.
pub fn load_json<T: DeserializeOwned>(store: &dyn SnapshotStore, key: &str) -> Option<T> {
    let raw = store.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding corrupt local snapshot");
            None
        }
    }
}

/// Serialize and save a JSON snapshot.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn SnapshotStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw)
}

/// File-backed store: `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory snapshots are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read local snapshot");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Atomic replace: write to a sibling temp file, then rename over the target
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
