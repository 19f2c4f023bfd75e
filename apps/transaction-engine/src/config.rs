//! Engine configuration.
//!
//! Defaults cover the demo runtime; every knob can be overridden through
//! `ENGINE_`-prefixed environment variables (e.g. `ENGINE_BROKER__PARTITION_COUNT=8`).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::RetryPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to load or deserialize configuration.
    #[error("Failed to load config: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Broker configuration.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Settlement configuration.
    #[serde(default)]
    pub settlement: SettlementConfig,
    /// Event publisher retry configuration.
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Consumer configuration.
    #[serde(default)]
    pub consumers: ConsumersConfig,
}

/// Broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Number of partitions per topic.
    #[serde(default = "default_partition_count")]
    pub partition_count: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            partition_count: default_partition_count(),
        }
    }
}

/// Settlement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Hard timeout for one settlement attempt, in milliseconds.
    #[serde(default = "default_settlement_timeout_ms")]
    pub timeout_ms: u64,
}

impl SettlementConfig {
    /// Timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_settlement_timeout_ms(),
        }
    }
}

/// Event publisher retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Maximum retry attempts per envelope.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Backoff cap, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Exponential multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Jitter factor (0.2 = ±20%).
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl PublisherConfig {
    /// Build the retry policy this configuration describes.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            self.backoff_multiplier,
            self.jitter_factor,
        )
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

/// Consumer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumersConfig {
    /// Idempotency ledger retention, in seconds. Must cover the broker's
    /// maximum redelivery window.
    #[serde(default = "default_ledger_retention_secs")]
    pub ledger_retention_secs: u64,
    /// Portfolio view cache time-to-live, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl ConsumersConfig {
    /// Ledger retention as a `Duration`.
    #[must_use]
    pub const fn ledger_retention(&self) -> Duration {
        Duration::from_secs(self.ledger_retention_secs)
    }

    /// Cache TTL as a `Duration`.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for ConsumersConfig {
    fn default() -> Self {
        Self {
            ledger_retention_secs: default_ledger_retention_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

const fn default_partition_count() -> usize {
    4
}

const fn default_settlement_timeout_ms() -> u64 {
    5_000
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_jitter_factor() -> f64 {
    0.2
}

const fn default_ledger_retention_secs() -> u64 {
    86_400
}

const fn default_cache_ttl_secs() -> u64 {
    300
}

/// Load configuration from the environment over the defaults.
///
/// # Errors
///
/// Returns error if deserialization or validation fails.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&EngineConfig::default())?)
        .add_source(config::Environment::with_prefix("ENGINE").separator("__"))
        .build()?
        .try_deserialize::<EngineConfig>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.broker.partition_count == 0 {
        return Err(ConfigError::ValidationError(
            "broker.partition_count must be at least 1".to_string(),
        ));
    }
    if config.settlement.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "settlement.timeout_ms must be positive".to_string(),
        ));
    }
    if config.publisher.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "publisher.backoff_multiplier must be at least 1.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.publisher.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "publisher.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }
    if config.consumers.ledger_retention_secs == 0 {
        return Err(ConfigError::ValidationError(
            "consumers.ledger_retention_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(validate(&config).is_ok());
        assert_eq!(config.broker.partition_count, 4);
        assert_eq!(config.settlement.timeout(), Duration::from_secs(5));
        assert_eq!(config.publisher.retry_policy().max_attempts, 5);
    }

    #[test]
    fn zero_partitions_rejected() {
        let config = EngineConfig {
            broker: BrokerConfig { partition_count: 0 },
            ..EngineConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn jitter_out_of_range_rejected() {
        let config = EngineConfig {
            publisher: PublisherConfig {
                jitter_factor: 1.5,
                ..PublisherConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(validate(&config).is_err());
    }
}
