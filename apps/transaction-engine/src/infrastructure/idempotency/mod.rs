//! Idempotency ledger adapters.

mod in_memory;

pub use in_memory::InMemoryIdempotencyLedger;
