//! Settlement Gateway Port (Driven Port)
//!
//! The settlement seam: a bounded-duration operation with no external side
//! effects other than the state change it informs. The caller enforces a
//! hard upper bound on duration; exceeding it counts as a settlement
//! failure, never an indefinite hang. A settlement failure moves the
//! transaction to FAILED, it never leaves it PROCESSING.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::transaction::Transaction;

/// Settlement outcome error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettlementError {
    /// The counterparty or settlement system rejected the transaction.
    #[error("Settlement rejected: {message}")]
    Rejected {
        /// Rejection reason.
        message: String,
    },

    /// The settlement system could not be reached.
    #[error("Settlement system unavailable: {message}")]
    Unavailable {
        /// Error description.
        message: String,
    },
}

/// Port for the settlement step.
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Settle a PROCESSING transaction. Success means COMPLETED, any error
    /// means FAILED.
    ///
    /// # Errors
    ///
    /// Returns error if settlement is rejected or unreachable.
    async fn settle(&self, transaction: &Transaction) -> Result<(), SettlementError>;
}

/// Settlement gateway that succeeds immediately. Useful for tests and the
/// demo binary.
#[derive(Debug, Clone, Default)]
pub struct InstantSettlement;

#[async_trait]
impl SettlementGateway for InstantSettlement {
    async fn settle(&self, _transaction: &Transaction) -> Result<(), SettlementError> {
        Ok(())
    }
}

/// Settlement gateway with a fixed latency and outcome, standing in for a
/// real integration.
#[derive(Debug, Clone)]
pub struct FixedLatencySettlement {
    latency: Duration,
    failure: Option<String>,
}

impl FixedLatencySettlement {
    /// Settlement that succeeds after `latency`.
    #[must_use]
    pub const fn succeeding(latency: Duration) -> Self {
        Self {
            latency,
            failure: None,
        }
    }

    /// Settlement that fails after `latency` with the given reason.
    #[must_use]
    pub const fn failing(latency: Duration, reason: String) -> Self {
        Self {
            latency,
            failure: Some(reason),
        }
    }
}

#[async_trait]
impl SettlementGateway for FixedLatencySettlement {
    async fn settle(&self, _transaction: &Transaction) -> Result<(), SettlementError> {
        tokio::time::sleep(self.latency).await;
        match &self.failure {
            None => Ok(()),
            Some(reason) => Err(SettlementError::Rejected {
                message: reason.clone(),
            }),
        }
    }
}
