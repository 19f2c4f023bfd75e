//! Notification adapters.

mod sinks;

pub use sinks::{LogSink, RecordingSink};
