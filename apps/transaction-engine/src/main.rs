//! Transaction Engine Binary
//!
//! Runs the engine end to end against the in-memory adapters: creates a
//! portfolio, drives a few transactions through the lifecycle, and lets the
//! consumers fold the resulting events into the portfolio projection.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin transaction-engine
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)
//! - `ENGINE_BROKER__PARTITION_COUNT`: Partitions per topic (default: 4)
//! - `ENGINE_SETTLEMENT__TIMEOUT_MS`: Settlement timeout (default: 5000)

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use transaction_engine::application::consumers::{NotificationConsumer, ProjectionUpdater};
use transaction_engine::application::ports::InstantSettlement;
use transaction_engine::application::services::{
    EventPublisher, PortfolioViewService, TransactionService,
};
use transaction_engine::config::load_config;
use transaction_engine::domain::portfolio::{Portfolio, PortfolioRepository};
use transaction_engine::domain::shared::{AccountNumber, ClientId, Money, Quantity, Symbol};
use transaction_engine::domain::transaction::{
    CreateTransactionCommand, Transaction, TransactionRepository, TransactionType,
};
use transaction_engine::infrastructure::broker::InMemoryBroker;
use transaction_engine::infrastructure::cache::InMemoryCache;
use transaction_engine::infrastructure::idempotency::InMemoryIdempotencyLedger;
use transaction_engine::infrastructure::notification::LogSink;
use transaction_engine::infrastructure::persistence::{
    InMemoryPortfolioRepository, InMemoryTransactionRepository,
};
use transaction_engine::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry();

    tracing::info!("Starting Transaction Engine");

    let config = load_config()?;
    tracing::info!(
        partition_count = config.broker.partition_count,
        settlement_timeout_ms = config.settlement.timeout_ms,
        "configuration loaded"
    );

    // Infrastructure
    let broker = Arc::new(InMemoryBroker::new(config.broker.partition_count));
    let transactions = Arc::new(InMemoryTransactionRepository::new());
    let portfolios = Arc::new(InMemoryPortfolioRepository::new());
    let cache = Arc::new(InMemoryCache::new());
    let ledger = Arc::new(InMemoryIdempotencyLedger::new(
        config.consumers.ledger_retention(),
    ));

    // Consumers
    Arc::new(ProjectionUpdater::new(
        Arc::clone(&portfolios),
        Arc::clone(&cache),
        Arc::clone(&ledger),
    ))
    .spawn(Arc::clone(&broker))
    .await?;

    Arc::new(NotificationConsumer::new(
        Arc::new(LogSink),
        Arc::clone(&ledger),
    ))
    .spawn(Arc::clone(&broker))
    .await?;

    // Services
    let publisher = Arc::new(EventPublisher::spawn(
        Arc::clone(&broker),
        config.publisher.retry_policy(),
    ));
    let service = TransactionService::new(
        Arc::clone(&transactions),
        publisher,
        Arc::new(InstantSettlement),
        config.settlement.timeout(),
    );
    let view = PortfolioViewService::new(
        Arc::clone(&portfolios),
        Arc::clone(&cache),
        config.consumers.cache_ttl(),
    );

    // Seed a portfolio
    let portfolio = Portfolio::new(
        ClientId::new("client-demo"),
        AccountNumber::new("ACC-0001"),
        "USD",
        Money::new(dec!(100000)),
    );
    let portfolio_id = portfolio.id().clone();
    let account = portfolio.account_number().clone();
    portfolios.save(&portfolio).await?;

    // Drive a few transactions through the lifecycle
    let buy = service
        .create(CreateTransactionCommand {
            portfolio_id: portfolio_id.clone(),
            account_number: account.clone(),
            transaction_type: TransactionType::Buy,
            symbol: Symbol::new("AAPL"),
            quantity: Quantity::from_i64(100),
            price: Money::new(dec!(150)),
            commission: Some(Money::new(dec!(9.99))),
            currency: "USD".to_string(),
            notes: None,
        })
        .await?;
    tracing::info!(transaction_id = %buy.id(), status = %buy.status(), "buy settled");

    let sell = service
        .create(CreateTransactionCommand {
            portfolio_id: portfolio_id.clone(),
            account_number: account.clone(),
            transaction_type: TransactionType::Sell,
            symbol: Symbol::new("AAPL"),
            quantity: Quantity::from_i64(40),
            price: Money::new(dec!(160)),
            commission: Some(Money::new(dec!(9.99))),
            currency: "USD".to_string(),
            notes: None,
        })
        .await?;
    tracing::info!(transaction_id = %sell.id(), status = %sell.status(), "sell settled");

    // A pending transaction can still be cancelled
    let mut pending = Transaction::new(CreateTransactionCommand {
        portfolio_id: portfolio_id.clone(),
        account_number: account,
        transaction_type: TransactionType::Buy,
        symbol: Symbol::new("MSFT"),
        quantity: Quantity::from_i64(10),
        price: Money::new(dec!(300)),
        commission: None,
        currency: "USD".to_string(),
        notes: None,
    })?;
    pending.drain_events();
    transactions.save(&pending).await?;
    let cancelled = service.cancel(pending.id()).await?;
    tracing::info!(transaction_id = %pending.id(), status = %cancelled, "cancel requested");

    // Give the background publisher and consumers a moment to catch up.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let projection = view.get(&portfolio_id).await?;
    tracing::info!(
        cash_balance = %projection.cash_balance(),
        total_value = %projection.total_value(),
        holdings = projection.holdings().len(),
        "portfolio projection"
    );
    for holding in projection.holdings() {
        tracing::info!(
            symbol = %holding.symbol(),
            quantity = %holding.quantity(),
            average_cost = %holding.average_cost(),
            market_value = %holding.market_value(),
            "holding"
        );
    }

    tracing::info!("Transaction Engine demo complete");
    Ok(())
}
