//! Transaction Service
//!
//! Drives the transaction state machine: the single synchronous entry point
//! for create, plus process and cancel. Every persisted transition is
//! announced through the publisher after the save; the transaction record
//! is the source of truth and publishing never rolls it back.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{SettlementGateway, TransitionPublisher};
use crate::domain::shared::TransactionId;
use crate::domain::transaction::{
    CreateTransactionCommand, Transaction, TransactionError, TransactionRepository,
    TransactionStatus,
};

/// Application service orchestrating the transaction lifecycle.
pub struct TransactionService<R, P, S>
where
    R: TransactionRepository,
    P: TransitionPublisher,
    S: SettlementGateway,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    settlement: Arc<S>,
    settlement_timeout: Duration,
}

impl<R, P, S> TransactionService<R, P, S>
where
    R: TransactionRepository,
    P: TransitionPublisher,
    S: SettlementGateway,
{
    /// Create a new `TransactionService`.
    pub const fn new(
        repository: Arc<R>,
        publisher: Arc<P>,
        settlement: Arc<S>,
        settlement_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            publisher,
            settlement,
            settlement_timeout,
        }
    }

    /// Create a transaction and immediately process it.
    ///
    /// Validation failures are returned before any state change and nothing
    /// is published. On success the returned record reflects the terminal
    /// outcome of processing (COMPLETED or FAILED).
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input, or a repository error.
    pub async fn create(
        &self,
        cmd: CreateTransactionCommand,
    ) -> Result<Transaction, TransactionError> {
        let mut transaction = Transaction::new(cmd)?;
        let id = transaction.id().clone();

        self.repository.save(&transaction).await?;
        self.publisher.publish_events(transaction.drain_events());
        tracing::info!(
            transaction_id = %id,
            transaction_type = %transaction.transaction_type(),
            symbol = %transaction.symbol(),
            "transaction created"
        );

        self.process(&id).await?;
        self.load(&id).await
    }

    /// Process a PENDING transaction through settlement.
    ///
    /// Calling this on a transaction that is not PENDING is a no-op that
    /// returns the current status, which makes duplicate invocation safe.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or a repository error.
    pub async fn process(&self, id: &TransactionId) -> Result<TransactionStatus, TransactionError> {
        let mut transaction = self.load(id).await?;

        if transaction.status() != TransactionStatus::Pending {
            tracing::debug!(
                transaction_id = %id,
                status = %transaction.status(),
                "process called on non-pending transaction, returning current status"
            );
            return Ok(transaction.status());
        }

        transaction.begin_processing()?;
        self.repository.save(&transaction).await?;
        self.publisher.publish_events(transaction.drain_events());

        let outcome =
            tokio::time::timeout(self.settlement_timeout, self.settlement.settle(&transaction))
                .await;

        // Cancel is legal from PROCESSING, so the stored record may have
        // changed while settlement was in flight. Re-load and only write the
        // terminal state if the transaction is still PROCESSING; otherwise
        // the settlement outcome is dropped and the stored status wins.
        let mut transaction = self.load(id).await?;
        if transaction.status() != TransactionStatus::Processing {
            tracing::info!(
                transaction_id = %id,
                status = %transaction.status(),
                "transaction left PROCESSING during settlement, discarding outcome"
            );
            return Ok(transaction.status());
        }

        match outcome {
            Ok(Ok(())) => {
                transaction.complete()?;
                tracing::info!(transaction_id = %id, "transaction completed");
            }
            Ok(Err(e)) => {
                transaction.fail(e.to_string())?;
                tracing::warn!(transaction_id = %id, error = %e, "settlement failed");
            }
            Err(_) => {
                transaction.fail(format!(
                    "settlement timed out after {:?}",
                    self.settlement_timeout
                ))?;
                tracing::warn!(
                    transaction_id = %id,
                    timeout = ?self.settlement_timeout,
                    "settlement timed out"
                );
            }
        }

        self.repository.save(&transaction).await?;
        self.publisher.publish_events(transaction.drain_events());
        Ok(transaction.status())
    }

    /// Cancel a PENDING or PROCESSING transaction.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` if the transaction is already terminal, or
    /// `NotFound` for an unknown id.
    pub async fn cancel(&self, id: &TransactionId) -> Result<TransactionStatus, TransactionError> {
        let mut transaction = self.load(id).await?;
        transaction.cancel()?;
        self.repository.save(&transaction).await?;
        self.publisher.publish_events(transaction.drain_events());
        tracing::info!(transaction_id = %id, "transaction cancelled");
        Ok(transaction.status())
    }

    /// Fetch a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub async fn get(&self, id: &TransactionId) -> Result<Transaction, TransactionError> {
        self.load(id).await
    }

    async fn load(&self, id: &TransactionId) -> Result<Transaction, TransactionError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| TransactionError::NotFound {
                transaction_id: id.to_string(),
            })
    }
}
