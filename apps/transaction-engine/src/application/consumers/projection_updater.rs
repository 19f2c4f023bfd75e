//! Portfolio Projection Updater
//!
//! Consumer that folds COMPLETED transaction events into portfolio
//! projections. All other event types are acknowledged without effect.
//! Deliveries are deduplicated through the idempotency ledger, applied
//! under a per-portfolio lock, persisted, and only then evicted from the
//! cache so readers never see a stale entry outlive its write.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::events::{EventEnvelope, EventType};
use crate::application::ports::{BrokerPort, CachePort, IdempotencyLedger, LedgerError, Subscription};
use crate::application::services::portfolio_cache_key;
use crate::domain::portfolio::{PortfolioError, PortfolioRepository};
use crate::domain::shared::PortfolioId;
use crate::domain::transaction::TransactionType;

/// Consumer group name in the idempotency ledger and at the broker.
pub const CONSUMER_NAME: &str = "portfolio-projection";

/// Projection handling error.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// Portfolio load or save failed.
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    /// Idempotency ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Applies completed transactions to portfolio projections.
pub struct ProjectionUpdater<R, C, L>
where
    R: PortfolioRepository,
    C: CachePort,
    L: IdempotencyLedger,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ledger: Arc<L>,
    // One lock per portfolio so events for different portfolios apply
    // concurrently while a single portfolio is always updated serially.
    locks: Mutex<HashMap<PortfolioId, Arc<Mutex<()>>>>,
}

impl<R, C, L> ProjectionUpdater<R, C, L>
where
    R: PortfolioRepository + 'static,
    C: CachePort + 'static,
    L: IdempotencyLedger + 'static,
{
    /// Create a new `ProjectionUpdater`.
    #[must_use]
    pub fn new(repository: Arc<R>, cache: Arc<C>, ledger: Arc<L>) -> Self {
        Self {
            repository,
            cache,
            ledger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to the broker and spawn one consumer task per partition.
    ///
    /// Each task applies deliveries in partition order and acknowledges
    /// after a successful (or deliberately skipped) application. Deliveries
    /// that fail on infrastructure are left unacknowledged for redelivery.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription cannot be established.
    pub async fn spawn<B>(
        self: Arc<Self>,
        broker: Arc<B>,
    ) -> Result<(), crate::application::ports::BrokerError>
    where
        B: BrokerPort + 'static,
    {
        let Subscription {
            topic, partitions, ..
        } = broker.subscribe(topic(), CONSUMER_NAME).await?;

        for (partition, mut receiver) in partitions.into_iter().enumerate() {
            let updater = Arc::clone(&self);
            let broker = Arc::clone(&broker);
            tokio::spawn(async move {
                while let Some(delivery) = receiver.recv().await {
                    let offset = delivery.offset;
                    match updater.handle_envelope(&delivery.envelope).await {
                        Ok(()) => {
                            if let Err(e) =
                                broker.ack(topic, CONSUMER_NAME, partition, offset).await
                            {
                                tracing::warn!(partition, offset, error = %e, "projection ack failed");
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                partition,
                                offset,
                                event_id = %delivery.envelope.event_id,
                                error = %e,
                                "projection update failed, leaving delivery unacknowledged"
                            );
                        }
                    }
                }
            });
        }
        Ok(())
    }

    /// Apply one delivered envelope to its portfolio projection.
    ///
    /// Non-COMPLETED events and duplicates return `Ok` without effect.
    ///
    /// # Errors
    ///
    /// Returns error on repository or ledger failure; those deliveries are
    /// retried. An oversell or an unknown portfolio is logged and marked
    /// seen instead, since no amount of redelivery will make it apply.
    pub async fn handle_envelope(&self, envelope: &EventEnvelope) -> Result<(), ProjectionError> {
        if envelope.event_type != EventType::TransactionCompleted {
            return Ok(());
        }
        if self.ledger.seen(CONSUMER_NAME, &envelope.event_id).await? {
            tracing::debug!(event_id = %envelope.event_id, "duplicate delivery, skipping");
            return Ok(());
        }

        let lock = self.lock_for(&envelope.portfolio_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.handle_guarded(envelope).await
        };
        drop(lock);
        self.prune_lock(&envelope.portfolio_id).await;
        result
    }

    async fn handle_guarded(&self, envelope: &EventEnvelope) -> Result<(), ProjectionError> {
        // Re-check under the lock: a concurrent delivery of the same event
        // on another partition could have won the race.
        if self.ledger.seen(CONSUMER_NAME, &envelope.event_id).await? {
            return Ok(());
        }

        match self.apply(envelope).await {
            Ok(()) => {}
            Err(ProjectionError::Portfolio(
                e @ (PortfolioError::InsufficientHolding { .. } | PortfolioError::NotFound { .. }),
            )) => {
                tracing::error!(
                    event_id = %envelope.event_id,
                    transaction_id = %envelope.transaction_id,
                    portfolio_id = %envelope.portfolio_id,
                    error = %e,
                    "projection cannot apply completed transaction, skipping event"
                );
            }
            Err(e) => return Err(e),
        }

        self.ledger.mark_seen(CONSUMER_NAME, &envelope.event_id).await?;
        Ok(())
    }

    async fn apply(&self, envelope: &EventEnvelope) -> Result<(), ProjectionError> {
        use crate::domain::shared::{Money, Quantity};

        let mut portfolio = self
            .repository
            .find_by_id(&envelope.portfolio_id)
            .await?
            .ok_or_else(|| PortfolioError::NotFound {
                portfolio_id: envelope.portfolio_id.to_string(),
            })?;

        let quantity = Quantity::new(envelope.quantity);
        let price = Money::new(envelope.price);
        let total_amount = Money::new(envelope.total_amount);
        let gross = price * envelope.quantity;

        match envelope.transaction_type {
            TransactionType::Buy => {
                portfolio.apply_buy(&envelope.symbol, quantity, price, total_amount);
            }
            TransactionType::Sell => {
                // total_amount carries gross + commission; the seller nets
                // gross - commission.
                let commission = total_amount - gross;
                let proceeds = gross - commission;
                portfolio.apply_sell(&envelope.symbol, quantity, price, proceeds)?;
            }
            TransactionType::Deposit | TransactionType::Dividend => {
                portfolio.credit_cash(total_amount);
            }
            TransactionType::Withdrawal => {
                portfolio.debit_cash(total_amount);
            }
        }

        self.repository.save(&portfolio).await?;
        // Evict strictly after the save so a refill can only observe the
        // persisted state.
        self.cache.evict(&portfolio_cache_key(&envelope.portfolio_id)).await;
        tracing::info!(
            transaction_id = %envelope.transaction_id,
            portfolio_id = %envelope.portfolio_id,
            transaction_type = %envelope.transaction_type,
            "portfolio projection updated"
        );
        Ok(())
    }

    async fn lock_for(&self, id: &PortfolioId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(id.clone()).or_default())
    }

    /// Drop a portfolio's lock entry once nothing else holds it, so the
    /// map stays bounded by the number of in-flight portfolios.
    async fn prune_lock(&self, id: &PortfolioId) {
        let mut locks = self.locks.lock().await;
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }
}

/// Topic this consumer reads.
const fn topic() -> crate::application::events::Topic {
    crate::application::events::Topic::TransactionEvents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::Portfolio;
    use crate::domain::shared::{
        AccountNumber, ClientId, EventId, Money, Quantity, Symbol, Timestamp, TransactionId,
    };
    use crate::domain::transaction::TransactionStatus;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::idempotency::InMemoryIdempotencyLedger;
    use crate::infrastructure::persistence::InMemoryPortfolioRepository;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    type Updater =
        ProjectionUpdater<InMemoryPortfolioRepository, InMemoryCache, InMemoryIdempotencyLedger>;

    struct Fixture {
        updater: Updater,
        repository: Arc<InMemoryPortfolioRepository>,
        cache: Arc<InMemoryCache>,
        portfolio_id: PortfolioId,
    }

    async fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryPortfolioRepository::new());
        let cache = Arc::new(InMemoryCache::new());
        let ledger = Arc::new(InMemoryIdempotencyLedger::new(
            std::time::Duration::from_secs(3600),
        ));
        let portfolio = Portfolio::new(
            ClientId::new("client-1"),
            AccountNumber::new("ACC-001"),
            "USD",
            Money::new(dec!(100000)),
        );
        let portfolio_id = portfolio.id().clone();
        repository.save(&portfolio).await.unwrap();
        Fixture {
            updater: ProjectionUpdater::new(Arc::clone(&repository), Arc::clone(&cache), ledger),
            repository,
            cache,
            portfolio_id,
        }
    }

    fn envelope(
        portfolio_id: &PortfolioId,
        event_type: EventType,
        transaction_type: TransactionType,
        quantity: Decimal,
        price: Decimal,
        total_amount: Decimal,
    ) -> EventEnvelope {
        EventEnvelope {
            event_id: EventId::generate(),
            event_type,
            transaction_id: TransactionId::generate(),
            portfolio_id: portfolio_id.clone(),
            account_number: AccountNumber::new("ACC-001"),
            transaction_type,
            symbol: Symbol::new("AAPL"),
            quantity,
            price,
            total_amount,
            status: match event_type {
                EventType::TransactionCompleted => TransactionStatus::Completed,
                _ => TransactionStatus::Pending,
            },
            timestamp: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn completed_buy_updates_projection_and_evicts_cache() {
        let f = fixture().await;
        let key = portfolio_cache_key(&f.portfolio_id);
        f.cache
            .put(&key, serde_json::json!({"stale": true}), std::time::Duration::from_secs(60))
            .await;

        let e = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Buy,
            dec!(100),
            dec!(150),
            dec!(15009.99),
        );
        f.updater.handle_envelope(&e).await.unwrap();

        let p = f.repository.find_by_id(&f.portfolio_id).await.unwrap().unwrap();
        assert_eq!(p.cash_balance().amount(), dec!(84990.01));
        assert_eq!(
            p.holding(&Symbol::new("AAPL")).unwrap().quantity(),
            Quantity::from_i64(100)
        );
        assert!(f.cache.get(&key).await.is_none(), "stale entry must be evicted");
    }

    #[tokio::test]
    async fn non_completed_events_are_ignored() {
        let f = fixture().await;
        for event_type in [
            EventType::TransactionCreated,
            EventType::TransactionProcessing,
            EventType::TransactionFailed,
            EventType::TransactionCancelled,
        ] {
            let e = envelope(
                &f.portfolio_id,
                event_type,
                TransactionType::Buy,
                dec!(10),
                dec!(100),
                dec!(1000),
            );
            f.updater.handle_envelope(&e).await.unwrap();
        }
        let p = f.repository.find_by_id(&f.portfolio_id).await.unwrap().unwrap();
        assert_eq!(p.cash_balance().amount(), dec!(100000));
        assert!(p.holdings().is_empty());
    }

    #[tokio::test]
    async fn duplicate_delivery_applies_once() {
        let f = fixture().await;
        let e = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Deposit,
            dec!(0),
            dec!(0),
            dec!(500),
        );
        f.updater.handle_envelope(&e).await.unwrap();
        f.updater.handle_envelope(&e).await.unwrap();

        let p = f.repository.find_by_id(&f.portfolio_id).await.unwrap().unwrap();
        assert_eq!(p.cash_balance().amount(), dec!(100500));
    }

    #[tokio::test]
    async fn sell_credits_net_proceeds() {
        let f = fixture().await;
        let buy = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Buy,
            dec!(100),
            dec!(100),
            dec!(10000),
        );
        f.updater.handle_envelope(&buy).await.unwrap();

        // Gross 50 * 110 = 5500, commission 9.99, net proceeds 5490.01.
        let sell = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Sell,
            dec!(50),
            dec!(110),
            dec!(5509.99),
        );
        f.updater.handle_envelope(&sell).await.unwrap();

        let p = f.repository.find_by_id(&f.portfolio_id).await.unwrap().unwrap();
        assert_eq!(p.cash_balance().amount(), dec!(95490.01));
        assert_eq!(
            p.holding(&Symbol::new("AAPL")).unwrap().quantity(),
            Quantity::from_i64(50)
        );
    }

    #[tokio::test]
    async fn oversell_is_skipped_not_retried() {
        let f = fixture().await;
        let e = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Sell,
            dec!(10),
            dec!(100),
            dec!(1000),
        );
        // Ok means acknowledged: the event is recorded as seen and a
        // redelivery is a no-op.
        f.updater.handle_envelope(&e).await.unwrap();
        f.updater.handle_envelope(&e).await.unwrap();

        let p = f.repository.find_by_id(&f.portfolio_id).await.unwrap().unwrap();
        assert_eq!(p.cash_balance().amount(), dec!(100000));
        assert!(p.holdings().is_empty());
    }

    #[tokio::test]
    async fn withdrawal_and_dividend_move_cash() {
        let f = fixture().await;
        let dividend = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Dividend,
            dec!(0),
            dec!(0),
            dec!(120.50),
        );
        let withdrawal = envelope(
            &f.portfolio_id,
            EventType::TransactionCompleted,
            TransactionType::Withdrawal,
            dec!(0),
            dec!(0),
            dec!(20000),
        );
        f.updater.handle_envelope(&dividend).await.unwrap();
        f.updater.handle_envelope(&withdrawal).await.unwrap();

        let p = f.repository.find_by_id(&f.portfolio_id).await.unwrap().unwrap();
        assert_eq!(p.cash_balance().amount(), dec!(80120.50));
    }

    #[tokio::test]
    async fn lock_map_is_pruned_after_handling() {
        let f = fixture().await;
        for _ in 0..5 {
            let e = envelope(
                &f.portfolio_id,
                EventType::TransactionCompleted,
                TransactionType::Deposit,
                dec!(0),
                dec!(0),
                dec!(100),
            );
            f.updater.handle_envelope(&e).await.unwrap();
        }
        assert!(f.updater.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_portfolio_is_skipped() {
        let f = fixture().await;
        let e = envelope(
            &PortfolioId::new("missing"),
            EventType::TransactionCompleted,
            TransactionType::Deposit,
            dec!(0),
            dec!(0),
            dec!(500),
        );
        f.updater.handle_envelope(&e).await.unwrap();
    }
}
