//! In-memory idempotency ledger with a retention window.
//!
//! Entries older than the retention window are dropped lazily on writes.
//! The window must cover the broker's maximum redelivery window, otherwise
//! a late redelivery would be applied twice.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::application::ports::{IdempotencyLedger, LedgerError};
use crate::domain::shared::EventId;

/// In-memory implementation of `IdempotencyLedger`.
///
/// Suitable for testing and development. Not for production use.
pub struct InMemoryIdempotencyLedger {
    retention: Duration,
    seen: RwLock<HashMap<(String, EventId), Instant>>,
}

impl InMemoryIdempotencyLedger {
    /// Create a ledger that retains entries for `retention`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            seen: RwLock::new(HashMap::new()),
        }
    }

    /// Number of retained entries, including any not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.read().unwrap().len()
    }

    /// Check if the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.read().unwrap().is_empty()
    }

    fn prune(seen: &mut HashMap<(String, EventId), Instant>, retention: Duration) {
        let cutoff = Instant::now().checked_sub(retention);
        if let Some(cutoff) = cutoff {
            seen.retain(|_, recorded_at| *recorded_at > cutoff);
        }
    }
}

#[async_trait]
impl IdempotencyLedger for InMemoryIdempotencyLedger {
    async fn seen(&self, consumer: &str, event_id: &EventId) -> Result<bool, LedgerError> {
        let seen = self.seen.read().unwrap();
        match seen.get(&(consumer.to_string(), event_id.clone())) {
            Some(recorded_at) => Ok(recorded_at.elapsed() <= self.retention),
            None => Ok(false),
        }
    }

    async fn mark_seen(&self, consumer: &str, event_id: &EventId) -> Result<(), LedgerError> {
        let mut seen = self.seen.write().unwrap();
        Self::prune(&mut seen, self.retention);
        seen.insert((consumer.to_string(), event_id.clone()), Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseen_then_seen() {
        let ledger = InMemoryIdempotencyLedger::new(Duration::from_secs(60));
        let id = EventId::generate();
        assert!(!ledger.seen("c1", &id).await.unwrap());
        ledger.mark_seen("c1", &id).await.unwrap();
        assert!(ledger.seen("c1", &id).await.unwrap());
    }

    #[tokio::test]
    async fn consumers_are_independent() {
        let ledger = InMemoryIdempotencyLedger::new(Duration::from_secs(60));
        let id = EventId::generate();
        ledger.mark_seen("c1", &id).await.unwrap();
        assert!(!ledger.seen("c2", &id).await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire_after_retention() {
        let ledger = InMemoryIdempotencyLedger::new(Duration::from_millis(10));
        let id = EventId::generate();
        ledger.mark_seen("c1", &id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!ledger.seen("c1", &id).await.unwrap());

        // A later write prunes the stale entry.
        ledger.mark_seen("c1", &EventId::generate()).await.unwrap();
        assert_eq!(ledger.len(), 1);
    }
}
