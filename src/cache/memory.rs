//! In-process cache store.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::CacheStore;
use crate::data::RawPayload;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: RawPayload,
    expires_at: Instant,
}

/// Thread-safe payload store with per-entry expiry
///
/// Reads and writes are atomic per key. Expired entries are dropped when
/// they are next read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Option<RawPayload> {
        let now = Instant::now();
        // The read guard must be released before removing.
        let fresh = {
            let entry = self.entries.get(key)?;
            (now < entry.expires_at).then(|| entry.value.clone())
        };
        if fresh.is_none() {
            self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
        }
        fresh
    }

    fn write(&self, key: &str, value: &RawPayload, ttl: Duration) -> std::io::Result<()> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
