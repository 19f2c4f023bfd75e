//! Portfolio Repository Trait
//!
//! Persistence abstraction for portfolios, implemented by infrastructure
//! adapters. Deletion is out of scope for the core.

use async_trait::async_trait;

use super::aggregate::Portfolio;
use super::errors::PortfolioError;
use crate::domain::shared::PortfolioId;

/// Repository trait for Portfolio persistence.
#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Save a portfolio (insert or update).
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError>;

    /// Find a portfolio by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &PortfolioId) -> Result<Option<Portfolio>, PortfolioError>;

    /// Find all portfolios, for listing use cases.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_all(&self) -> Result<Vec<Portfolio>, PortfolioError>;
}
