//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driver Ports** (Primary/Inbound): How the world uses our application
//! - **Driven Ports** (Secondary/Outbound): How our application uses external systems

mod broker_port;
mod cache_port;
mod event_publisher_port;
mod idempotency_port;
mod notification_port;
mod settlement_port;

pub use broker_port::{BrokerError, BrokerPort, Delivery, Subscription};
pub use cache_port::CachePort;
pub use event_publisher_port::{NoOpTransitionPublisher, TransitionPublisher};
pub use idempotency_port::{IdempotencyLedger, LedgerError};
pub use notification_port::{Notification, NotificationError, NotificationSink};
pub use settlement_port::{
    FixedLatencySettlement, InstantSettlement, SettlementError, SettlementGateway,
};
