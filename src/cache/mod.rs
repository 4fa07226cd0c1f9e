//! Read-through cache for provider responses
//!
//! Forecast payloads are cached by postal code for a fixed 30 minutes. The
//! backing store is pluggable: `MemoryStore` keeps entries in-process and
//! `CacheManager` persists them as JSON files so separate runs share them.
//! Requests without a postal code bypass the cache entirely.

mod manager;
mod memory;

pub use manager::CacheManager;
pub use memory::MemoryStore;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::data::RawPayload;

/// Time-to-live for cached forecast payloads
pub const FORECAST_TTL: Duration = Duration::from_secs(30 * 60);

/// Prefix that namespaces forecast entries within a shared store
const KEY_PREFIX: &str = "forecast_";

/// A key-value store with per-entry expiry
///
/// Implementations may block; `ForecastCache` calls them from the blocking
/// thread pool, never on an async worker.
pub trait CacheStore: Send + Sync {
    /// Returns the stored payload if present and not expired
    fn read(&self, key: &str) -> Option<RawPayload>;

    /// Stores a payload, replacing any previous value for the key
    fn write(&self, key: &str, value: &RawPayload, ttl: Duration) -> std::io::Result<()>;
}

/// Derives the cache key for a postal code
pub fn cache_key(postal_code: &str) -> String {
    format!("{}{}", KEY_PREFIX, postal_code)
}

/// Read-through cache wrapper around a `CacheStore`
#[derive(Clone)]
pub struct ForecastCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ForecastCache {
    /// Creates a cache over the given store with the standard forecast TTL
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            ttl: FORECAST_TTL,
        }
    }

    /// Returns the cached payload for `key`, or runs `producer` and stores its result
    ///
    /// # Arguments
    /// * `key` - Cache key, or `None` to bypass the cache
    /// * `producer` - Fetches a fresh payload on a miss
    ///
    /// # Returns
    /// * `Ok((payload, true))` - Served from the cache, `producer` not called
    /// * `Ok((payload, false))` - Fresh payload; stored only if successful
    /// * `Err(E)` - The producer failed; nothing was stored
    pub async fn fetch_or_populate<F, Fut, E>(
        &self,
        key: Option<&str>,
        producer: F,
    ) -> Result<(RawPayload, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RawPayload, E>>,
    {
        let Some(key) = key else {
            return Ok((producer().await?, false));
        };

        if let Some(cached) = self.read_store(key).await {
            if !cached.body.is_empty() {
                tracing::debug!(key, "Cache hit");
                return Ok((cached, true));
            }
        }

        tracing::debug!(key, "Cache miss");
        let fresh = producer().await?;

        if fresh.is_success() {
            if let Err(e) = self.write_store(key, &fresh).await {
                tracing::warn!(key, error = %e, "Failed to write forecast to cache");
            }
        }

        Ok((fresh, false))
    }

    async fn read_store(&self, key: &str) -> Option<RawPayload> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        match tokio::task::spawn_blocking(move || store.read(&key)).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "Cache read task failed");
                None
            }
        }
    }

    async fn write_store(&self, key: &str, value: &RawPayload) -> std::io::Result<()> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        let value = value.clone();
        let ttl = self.ttl;
        tokio::task::spawn_blocking(move || store.write(&key, &value, ttl))
            .await
            .map_err(std::io::Error::other)?
    }
}

impl std::fmt::Debug for ForecastCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastCache").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Store that records every write
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        writes: Mutex<Vec<(String, Duration)>>,
    }

    impl CacheStore for RecordingStore {
        fn read(&self, key: &str) -> Option<RawPayload> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &RawPayload, ttl: Duration) -> std::io::Result<()> {
            self.writes.lock().unwrap().push((key.to_string(), ttl));
            self.inner.write(key, value, ttl)
        }
    }

    struct FailingStore;

    impl CacheStore for FailingStore {
        fn read(&self, _key: &str) -> Option<RawPayload> {
            None
        }

        fn write(&self, _key: &str, _value: &RawPayload, _ttl: Duration) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn setup() -> (ForecastCache, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        (ForecastCache::new(store.clone()), store)
    }

    async fn produce(
        calls: &AtomicUsize,
        payload: RawPayload,
    ) -> Result<RawPayload, std::io::Error> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(payload)
    }

    #[test]
    fn test_cache_key_is_namespaced() {
        assert_eq!(cache_key("94102"), "forecast_94102");
    }

    #[tokio::test]
    async fn test_no_key_always_invokes_producer() {
        let (cache, store) = setup();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let (payload, hit) = cache
                .fetch_or_populate(None, || produce(&calls, RawPayload::new(200, "{}")))
                .await
                .unwrap();
            assert!(!hit);
            assert_eq!(payload.status, 200);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(store.writes.lock().unwrap().is_empty());
        assert!(store.inner.is_empty());
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (cache, store) = setup();
        let calls = AtomicUsize::new(0);
        let key = cache_key("94102");

        let (first, hit) = cache
            .fetch_or_populate(Some(key.as_str()), || produce(&calls, RawPayload::new(200, "{\"a\":1}")))
            .await
            .unwrap();
        assert!(!hit);

        let (second, hit) = cache
            .fetch_or_populate(Some(key.as_str()), || produce(&calls, RawPayload::new(200, "other")))
            .await
            .unwrap();
        assert!(hit);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.as_slice(), &[(key.clone(), FORECAST_TTL)]);
    }

    #[tokio::test]
    async fn test_unsuccessful_response_is_returned_but_not_stored() {
        let (cache, store) = setup();
        let calls = AtomicUsize::new(0);
        let key = cache_key("10001");

        let (payload, hit) = cache
            .fetch_or_populate(Some(key.as_str()), || produce(&calls, RawPayload::new(503, "busy")))
            .await
            .unwrap();

        assert!(!hit);
        assert_eq!(payload.status, 503);
        assert!(store.writes.lock().unwrap().is_empty());
        assert!(store.read(&key).is_none());
    }

    #[tokio::test]
    async fn test_producer_error_propagates_without_write() {
        let (cache, store) = setup();
        let key = cache_key("10001");

        let result: Result<_, std::io::Error> = cache
            .fetch_or_populate(Some(key.as_str()), || async {
                Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout"))
            })
            .await;

        assert!(result.is_err());
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_cached_body_counts_as_miss() {
        let (cache, store) = setup();
        let calls = AtomicUsize::new(0);
        let key = cache_key("60601");
        store.inner.write(&key, &RawPayload::new(200, ""), FORECAST_TTL).unwrap();

        let (payload, hit) = cache
            .fetch_or_populate(Some(key.as_str()), || produce(&calls, RawPayload::new(200, "{}")))
            .await
            .unwrap();

        assert!(!hit);
        assert_eq!(payload.body, "{}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Store that records which thread each call ran on
    #[derive(Default)]
    struct ThreadTrackingStore {
        threads: Mutex<Vec<std::thread::ThreadId>>,
    }

    impl CacheStore for ThreadTrackingStore {
        fn read(&self, _key: &str) -> Option<RawPayload> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            None
        }

        fn write(&self, _key: &str, _value: &RawPayload, _ttl: Duration) -> std::io::Result<()> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_calls_run_off_the_async_worker() {
        let store = Arc::new(ThreadTrackingStore::default());
        let cache = ForecastCache::new(store.clone());
        let calls = AtomicUsize::new(0);

        cache
            .fetch_or_populate(Some("forecast_94102"), || produce(&calls, RawPayload::new(200, "{}")))
            .await
            .unwrap();

        let worker = std::thread::current().id();
        let threads = store.threads.lock().unwrap();
        assert_eq!(threads.len(), 2, "expected one read and one write");
        assert!(threads.iter().all(|id| *id != worker));
    }

    #[tokio::test]
    async fn test_store_write_failure_does_not_fail_request() {
        let cache = ForecastCache::new(Arc::new(FailingStore));
        let calls = AtomicUsize::new(0);

        let (payload, hit) = cache
            .fetch_or_populate(Some("forecast_1"), || produce(&calls, RawPayload::new(200, "{}")))
            .await
            .unwrap();

        assert!(!hit);
        assert_eq!(payload.body, "{}");
    }
}
