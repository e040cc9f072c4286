//! Key-value store wrapper with automatic serialization.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::CacheError;

type Entries = BTreeMap<String, serde_json::Value>;

/// Type-safe cache with JSON values.
pub struct Cache {
    backend: Backend,
}

enum Backend {
    Memory(Mutex<Entries>),
    /// Entries mirrored to a JSON object on disk after every write.
    File { path: PathBuf, entries: Mutex<Entries> },
}

impl Cache {
    /// An in-memory store; contents are lost on drop.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(Entries::new())),
        }
    }

    /// Open a store persisted as a JSON object at `path`.
    ///
    /// A missing file is an empty store; it is created on the first write.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Entries::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                CacheError::OpenError(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(e) => return Err(CacheError::Io(e)),
        };
        Ok(Self {
            backend: Backend::File {
                path,
                entries: Mutex::new(entries),
            },
        })
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let entries = self.entries()?;
        match entries.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(value)?;
        let mut entries = self.entries()?;
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries()?.contains_key(key))
    }

    fn entries(&self) -> Result<MutexGuard<'_, Entries>, CacheError> {
        let lock = match &self.backend {
            Backend::Memory(entries) => entries,
            Backend::File { entries, .. } => entries,
        };
        lock.lock()
            .map_err(|_| CacheError::StoreError("store lock poisoned".to_string()))
    }

    fn persist(&self, entries: &Entries) -> Result<(), CacheError> {
        let Backend::File { path, .. } = &self.backend else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backend {
            Backend::Memory(_) => f.debug_struct("Cache").field("backend", &"memory").finish(),
            Backend::File { path, .. } => f.debug_struct("Cache").field("file", path).finish(),
        }
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("vote", sale_id);
/// // Returns "vote:<sale_id>"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
