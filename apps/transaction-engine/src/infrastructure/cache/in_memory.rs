//! In-memory TTL cache.
//!
//! Entries expire lazily: an expired entry is dropped on the next `get`
//! that touches it. That keeps the adapter free of background tasks while
//! preserving the miss-on-expiry contract.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::CachePort;

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-memory implementation of `CachePort`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries, including any not yet lazily expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl CachePort for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let expired = {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.entries.write().unwrap().remove(key);
        }
        None
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn evict(&self, key: &str) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get() {
        let cache = InMemoryCache::new();
        cache.put("k", json!({"a": 1}), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = InMemoryCache::new();
        cache.put("k", json!(1), Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.is_empty(), "expired entry should be dropped on get");
    }

    #[tokio::test]
    async fn evict_removes_and_is_idempotent() {
        let cache = InMemoryCache::new();
        cache.put("k", json!(1), Duration::from_secs(60)).await;
        cache.evict("k").await;
        cache.evict("k").await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let cache = InMemoryCache::new();
        cache.put("k", json!(1), Duration::from_secs(60)).await;
        cache.put("k", json!(2), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }
}
