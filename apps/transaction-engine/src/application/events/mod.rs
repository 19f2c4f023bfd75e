//! Application-level event contract.

mod envelope;

pub use envelope::{EventEnvelope, EventType, Topic};
