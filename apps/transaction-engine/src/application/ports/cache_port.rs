//! Cache Port (Driven Port)
//!
//! Key/value cache for read views. The cache is best-effort: a miss (or an
//! adapter degrading to a miss on failure) falls through to the source of
//! truth, so the interface is infallible by design. What matters is the
//! ordering contract: writers evict strictly after persisting, so a reader
//! never observes an entry older than the write it reflects.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Port for the key/value cache.
#[async_trait]
pub trait CachePort: Send + Sync {
    /// Look up a cached value. `None` is a miss.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value with a time-to-live.
    async fn put(&self, key: &str, value: Value, ttl: Duration);

    /// Remove a value. Evicting an absent key is a no-op.
    async fn evict(&self, key: &str);
}
