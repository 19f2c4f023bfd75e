//! Transaction Repository Trait
//!
//! Defines the persistence abstraction for transactions.
//! Implemented by adapters in the infrastructure layer. Transactions are an
//! append-only audit trail, so the trait deliberately has no delete.

use async_trait::async_trait;

use super::aggregate::Transaction;
use super::errors::TransactionError;
use crate::domain::shared::{PortfolioId, TransactionId};

/// Repository trait for Transaction persistence.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Save a transaction (insert or update).
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn save(&self, transaction: &Transaction) -> Result<(), TransactionError>;

    /// Find a transaction by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, TransactionError>;

    /// Find all transactions for a portfolio, for listing use cases.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_portfolio(
        &self,
        portfolio_id: &PortfolioId,
    ) -> Result<Vec<Transaction>, TransactionError>;

    /// Find all transactions.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_all(&self) -> Result<Vec<Transaction>, TransactionError>;
}
