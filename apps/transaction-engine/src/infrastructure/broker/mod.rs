//! Broker adapters.

mod in_memory;

pub use in_memory::{DEFAULT_PARTITION_COUNT, InMemoryBroker};
