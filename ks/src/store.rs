//! Core KvStore implementation

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::backend::{Backend, FileBackend, MemoryBackend};
use crate::error::{KvError, KvResult};

/// Handle to a document store, cheap to clone
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn Backend>,
}

impl KvStore {
    /// Open or create a file-backed store at the given directory
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let backend = FileBackend::open(path)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Create a store that lives only in memory
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    /// Wrap an existing backend
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Load a document, `Ok(None)` when the key is absent
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        validate_key(key)?;
        let Some(text) = self.backend.read(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&text).map_err(|source| KvError::Deserialize {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    /// Load a document, logging and returning `None` on any failure
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        debug!(%key, "load: called");
        match self.try_load(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "Error loading document, falling back to default");
                None
            }
        }
    }

    /// Load a document or fall back to the given default
    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load(key).unwrap_or(default)
    }

    /// Serialize and store a document
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<()> {
        validate_key(key)?;
        let text = serde_json::to_string(value).map_err(|source| KvError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key, &text)
    }

    /// Store a document, logging instead of failing; returns whether it was written
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        debug!(%key, "save: called");
        match self.try_save(key, value) {
            Ok(()) => true,
            Err(e) => {
                error!(%key, error = %e, "Error saving document");
                false
            }
        }
    }

    /// Remove a document, returning whether it existed
    pub fn remove(&self, key: &str) -> KvResult<bool> {
        validate_key(key)?;
        self.backend.remove(key)
    }

    /// Check whether a key has a stored document
    pub fn contains(&self, key: &str) -> bool {
        validate_key(key).is_ok() && matches!(self.backend.read(key), Ok(Some(_)))
    }

    /// List stored keys
    pub fn keys(&self) -> KvResult<Vec<String>> {
        self.backend.keys()
    }
}

fn validate_key(key: &str) -> KvResult<()> {
    let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(KvError::InvalidKey(key.to_string()))
    }
}
