//! Keyed JSON blob persistence, the stand-in for browser local storage.
//!
//! Writes are whole-object serializations: last write wins, nothing merges.
//! [`FileBlobStore`] writes each blob to a temp file and renames it into
//! place under an advisory lock, so readers never see half a blob.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::StorageError;

const LOCK_FILE: &str = ".lock";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// A keyed string store.
pub trait BlobStore {
    /// Raw blob text, or `None` when the key was never written.
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Load and decode a blob, falling back to `T::default()` when it is
/// missing or unreadable.
pub fn load_blob<T>(store: &dyn BlobStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get_raw(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            warn!(key, error = %err, "falling back to empty blob");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(source) => {
            let err = StorageError::Json {
                key: key.to_string(),
                source,
            };
            warn!(key, code = %err.code(), error = %err, "falling back to empty blob");
            T::default()
        }
    }
}

/// Serialize and store a blob.
///
/// # Errors
///
/// Returns [`StorageError`] if encoding or the store write fails.
pub fn save_blob<T: Serialize>(
    store: &mut dyn BlobStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set_raw(key, &raw)?;
    debug!(key, bytes = raw.len(), "blob saved");
    Ok(())
}

/// In-process store; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl FileBlobStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        Ok(Self {
            dir,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// File backing `key`; `:` is not portable in file names.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', "_")))
    }

    fn lock(&self, kind: LockKind) -> Result<BlobLock, StorageError> {
        BlobLock::acquire(&self.dir.join(LOCK_FILE), self.lock_timeout, kind)
    }
}

impl BlobStore for FileBlobStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        let _guard = self.lock(LockKind::Shared)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let _guard = self.lock(LockKind::Exclusive)?;
        fs::write(&tmp, value).map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, &path).map_err(|source| io_error(&path, source))
    }
}

fn io_error(path: &Path, source: io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[derive(Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

/// Advisory lock on the store's lock file, released on drop.
#[derive(Debug)]
struct BlobLock {
    file: File,
}

impl BlobLock {
    fn acquire(path: &Path, timeout: Duration, kind: LockKind) -> Result<Self, StorageError> {
        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)
                .map_err(|source| io_error(path, source))?;

            let busy = match kind {
                LockKind::Shared => file.try_lock_shared().is_err(),
                LockKind::Exclusive => file.try_lock_exclusive().is_err(),
            };

            if !busy {
                return Ok(Self { file });
            }

            if start.elapsed() >= timeout {
                return Err(StorageError::LockTimeout {
                    path: path.display().to_string(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for BlobLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
