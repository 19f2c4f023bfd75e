//! Portfolio View Service
//!
//! Read-through cached access to portfolio projections. The repository is
//! the source of truth; the cache only shortcuts reads and is refilled on
//! a miss. Writers (the projection updater) evict after persisting, so a
//! hit is never older than the projection it reflects.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::CachePort;
use crate::domain::portfolio::{Portfolio, PortfolioError, PortfolioRepository};
use crate::domain::shared::PortfolioId;

/// Cache key for a portfolio projection.
#[must_use]
pub fn portfolio_cache_key(id: &PortfolioId) -> String {
    format!("portfolio:{id}")
}

/// Cached read side for portfolio projections.
pub struct PortfolioViewService<R, C>
where
    R: PortfolioRepository,
    C: CachePort,
{
    repository: Arc<R>,
    cache: Arc<C>,
    cache_ttl: Duration,
}

impl<R, C> PortfolioViewService<R, C>
where
    R: PortfolioRepository,
    C: CachePort,
{
    /// Create a new `PortfolioViewService`.
    pub const fn new(repository: Arc<R>, cache: Arc<C>, cache_ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            cache_ttl,
        }
    }

    /// Fetch a portfolio, preferring the cache.
    ///
    /// A cache entry that fails to deserialize is treated as a miss and
    /// evicted, then the read falls through to the repository.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or a repository error.
    pub async fn get(&self, id: &PortfolioId) -> Result<Portfolio, PortfolioError> {
        let key = portfolio_cache_key(id);

        if let Some(value) = self.cache.get(&key).await {
            match serde_json::from_value::<Portfolio>(value) {
                Ok(portfolio) => {
                    tracing::debug!(portfolio_id = %id, "portfolio view cache hit");
                    return Ok(portfolio);
                }
                Err(e) => {
                    tracing::warn!(portfolio_id = %id, error = %e, "evicting undecodable cache entry");
                    self.cache.evict(&key).await;
                }
            }
        }

        let portfolio = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| PortfolioError::NotFound {
                portfolio_id: id.to_string(),
            })?;

        if let Ok(value) = serde_json::to_value(&portfolio) {
            self.cache.put(&key, value, self.cache_ttl).await;
        }
        Ok(portfolio)
    }
}
