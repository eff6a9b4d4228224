//! Local persistent key-value cache.
//!
//! The anonymous cart is a single serialized snapshot under the `"cart"`
//! key, the same contract the browser build kept in localStorage. The cache
//! is deliberately dumb: get a string, set a string.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Key under which the cart snapshot is stored.
pub const CART_KEY: &str = "cart";

/// Errors from the local cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A persistent string-to-string cache.
pub trait KeyValueCache: Send + Sync {
    /// Read a value; `None` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// File-backed cache: one JSON file per key inside a directory.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `dir`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves a half-written snapshot.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }
}

/// In-memory cache for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCache {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let map = self.map.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut map = self.map.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert!(cache.get(CART_KEY).unwrap().is_none());

        cache.set(CART_KEY, "[]").unwrap();
        assert_eq!(cache.get(CART_KEY).unwrap().as_deref(), Some("[]"));

        cache.set(CART_KEY, "[1]").unwrap();
        assert_eq!(cache.get(CART_KEY).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_cache_round_trip() {
        let dir = std::env::temp_dir().join(format!("amastore-test-{}", uuid::Uuid::new_v4()));
        let cache = FileCache::new(dir.clone());

        assert!(cache.get(CART_KEY).unwrap().is_none());
        cache.set(CART_KEY, "{\"x\":1}").unwrap();
        assert_eq!(cache.get(CART_KEY).unwrap().as_deref(), Some("{\"x\":1}"));

        // Overwrite replaces the previous snapshot wholesale.
        cache.set(CART_KEY, "{}").unwrap();
        assert_eq!(cache.get(CART_KEY).unwrap().as_deref(), Some("{}"));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
