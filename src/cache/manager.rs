//! Cache manager for persisting provider responses to disk
//!
//! Provides a `CacheManager` that stores payloads as JSON files with expiry
//! timestamps, so separate CLI invocations share cached forecasts.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use super::CacheStore;
use crate::data::RawPayload;

/// Wrapper struct for cached payloads stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached payload
    data: RawPayload,
    /// When the payload was cached
    cached_at: DateTime<Utc>,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Manages reading and writing cached payloads to disk
///
/// The cache manager stores entries as JSON files in an XDG-compliant cache
/// directory (`~/.cache/zipcast/` on Linux). Each entry includes an expiry
/// timestamp and expired entries are never returned.
///
/// All file access is blocking; `ForecastCache` moves it off the async
/// workers.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "zipcast")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Keys are percent-encoded, so distinct keys never share a file.
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Returns the entry for `key`, or `None` if it is missing or unreadable
    fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl CacheStore for CacheManager {
    fn read(&self, key: &str) -> Option<RawPayload> {
        let entry = self.read_entry(key)?;
        if entry.is_expired() {
            tracing::debug!(key, cached_at = %entry.cached_at, "Disk cache entry expired");
            return None;
        }
        Some(entry.data)
    }

    /// Writes a payload that stays fresh for `ttl`
    fn write(&self, key: &str, value: &RawPayload, ttl: Duration) -> std::io::Result<()> {
        self.ensure_dir()?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let now = Utc::now();
        let entry = CacheEntry {
            data: value.clone(),
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }
}
