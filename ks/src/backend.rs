//! Storage backends for KvStore
//!
//! A backend moves raw document text in and out of some medium. Encoding and
//! the fail-soft policy live one level up in [`crate::KvStore`].

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::DOCUMENT_EXTENSION;
use crate::error::{KvError, KvResult};

/// Raw document storage keyed by validated key names
pub trait Backend: Send + Sync {
    /// Read the document text for a key, `None` when absent
    fn read(&self, key: &str) -> KvResult<Option<String>>;

    /// Replace the document text for a key
    fn write(&self, key: &str, contents: &str) -> KvResult<()>;

    /// Remove a key, returning whether it existed
    fn remove(&self, key: &str) -> KvResult<bool>;

    /// List stored keys in sorted order
    fn keys(&self) -> KvResult<Vec<String>>;
}

/// One `<key>.json` file per key inside a directory
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Open or create the backing directory
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "FileBackend::open: opened");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", key, DOCUMENT_EXTENSION))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        let path = self.document_path(key);
        if !path.exists() {
            debug!(%key, "FileBackend::read: no document");
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, contents: &str) -> KvResult<()> {
        let path = self.document_path(key);
        let tmp_path = self.base_path.join(format!(".{}.{}.tmp", key, DOCUMENT_EXTENSION));

        // Write to a sibling temp file and rename over the target
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)?;

        debug!(%key, bytes = contents.len(), "FileBackend::write: document written");
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<bool> {
        let path = self.document_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().map(|e| e == DOCUMENT_EXTENSION).unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !stem.starts_with('.')
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-process backend, nothing touches disk
#[derive(Default)]
pub struct MemoryBackend {
    documents: Mutex<BTreeMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write and remove fail with a permission error
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self) -> KvResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(KvError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory backend is read-only",
            )));
        }
        Ok(())
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.documents().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> KvResult<()> {
        self.check_writable()?;
        self.documents().insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<bool> {
        self.check_writable()?;
        Ok(self.documents().remove(key).is_some())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        Ok(self.documents().keys().cloned().collect())
    }
}
