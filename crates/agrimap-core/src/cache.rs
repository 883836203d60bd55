//! Key-versioned persistent TTL cache.
//!
//! Staleness never deletes an entry: an expired entry remains readable as a
//! degraded fallback until explicitly overwritten or cleared. Storage
//! failures are logged and degrade to cache-miss behavior; they never
//! propagate to the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CacheIoError;

/// Bumped whenever the cached payload format changes; mismatched keys are
/// purged at startup so a schema change cannot serve stale-format data.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Build the canonical cache key `<namespace>_v<version>_<selector>`.
pub fn cache_key(namespace: &str, selector: &str) -> String {
    format!("{namespace}_v{CACHE_SCHEMA_VERSION}_{selector}")
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// A cached payload plus its write timestamp, serialized as
/// `{"data": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    #[serde(rename = "data")]
    pub payload: T,
    #[serde(rename = "timestamp")]
    pub stored_at_ms: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, stored_at_ms: u64) -> Self {
        Self {
            payload,
            stored_at_ms,
        }
    }

    /// Fresh iff less than `ttl` has elapsed since the write.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(ttl, now_ms())
    }

    pub(crate) fn is_fresh_at(&self, ttl: Duration, now: u64) -> bool {
        now.saturating_sub(self.stored_at_ms) < ttl.as_millis() as u64
    }
}

/// Storage backend seam for the cache store.
///
/// Implementations carry the only side effects in this module; the store
/// itself is pure key/serialization logic over the medium.
pub trait CacheMedium: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, CacheIoError>;
    fn write(&self, key: &str, value: &str) -> Result<(), CacheIoError>;
    fn remove(&self, key: &str) -> Result<(), CacheIoError>;
    fn keys(&self) -> Result<Vec<String>, CacheIoError>;
}

/// File-per-key medium under a cache directory.
#[derive(Debug, Clone)]
pub struct FileCacheMedium {
    dir: PathBuf,
}

impl FileCacheMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheMedium for FileCacheMedium {
    fn read(&self, key: &str) -> Result<Option<String>, CacheIoError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheIoError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheIoError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheIoError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(key) = name.to_string_lossy().strip_suffix(".json") {
                keys.push(key.to_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-memory medium used as a test double.
#[derive(Debug, Default)]
pub struct MemoryCacheMedium {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryCacheMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheMedium for MemoryCacheMedium {
    fn read(&self, key: &str) -> Result<Option<String>, CacheIoError> {
        Ok(self.map.lock().expect("lock poisoned").get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheIoError> {
        self.map
            .lock()
            .expect("lock poisoned")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheIoError> {
        self.map.lock().expect("lock poisoned").remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheIoError> {
        let mut keys: Vec<String> = self
            .map
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Cache store over an injected medium.
#[derive(Clone)]
pub struct CacheStore {
    medium: Arc<dyn CacheMedium>,
}

impl CacheStore {
    pub fn new(medium: Arc<dyn CacheMedium>) -> Self {
        Self { medium }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheMedium::new()))
    }

    /// Read an entry regardless of freshness; callers decide staleness via
    /// [`CacheEntry::is_fresh`]. Corrupt or unreadable entries degrade to a
    /// miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let text = match self.medium.read(key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(error) => {
                warn!(key, %error, "cache read failed, degrading to miss");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(key, %error, "cache entry corrupt, degrading to miss");
                None
            }
        }
    }

    /// Best-effort write stamped with the current time.
    pub fn set<T: Serialize>(&self, key: &str, payload: &T) {
        self.set_at(key, payload, now_ms());
    }

    pub(crate) fn set_at<T: Serialize>(&self, key: &str, payload: &T, stored_at_ms: u64) {
        let entry = CacheEntry {
            payload,
            stored_at_ms,
        };
        let text = match serde_json::to_string(&entry) {
            Ok(text) => text,
            Err(error) => {
                warn!(key, %error, "cache entry serialization failed, skipping write");
                return;
            }
        };
        if let Err(error) = self.medium.write(key, &text) {
            warn!(key, %error, "cache write failed, entry not persisted");
        }
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn clear(&self, prefix: &str) {
        let keys = match self.medium.keys() {
            Ok(keys) => keys,
            Err(error) => {
                warn!(%error, "cache key listing failed, nothing cleared");
                return;
            }
        };
        for key in keys.iter().filter(|key| key.starts_with(prefix)) {
            if let Err(error) = self.medium.remove(key) {
                warn!(key, %error, "cache entry removal failed");
            }
        }
    }

    /// Purge keys in `namespace` carrying a schema version other than the
    /// current one. Called once at startup.
    pub fn purge_mismatched(&self, namespace: &str) {
        let current_prefix = format!("{namespace}_v{CACHE_SCHEMA_VERSION}_");
        let namespace_prefix = format!("{namespace}_v");
        let keys = match self.medium.keys() {
            Ok(keys) => keys,
            Err(error) => {
                warn!(%error, "cache key listing failed, version purge skipped");
                return;
            }
        };
        for key in keys {
            if key.starts_with(&namespace_prefix) && !key.starts_with(&current_prefix) {
                debug!(key, "purging cache entry with mismatched schema version");
                if let Err(error) = self.medium.remove(&key) {
                    warn!(key, %error, "cache entry removal failed");
                }
            }
        }
    }
}
