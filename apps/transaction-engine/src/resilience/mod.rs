//! Resilience patterns for external service calls.

mod retry;

pub use retry::{ExponentialBackoff, RetryPolicy};
