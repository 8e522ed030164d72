//! Configuration Builder
//!
//! Fluent builder for CSRF lifecycle configuration.

use std::time::Duration;

use crate::error::{ConfigurationError, CsrfError};
use crate::types::CsrfConfig;

/// CSRF configuration builder.
pub struct CsrfConfigBuilder {
    default_ttl: Duration,
    grace_period: Duration,
    sweep_interval: Duration,
    max_token_length: usize,
}

impl CsrfConfigBuilder {
    /// Create new builder seeded with defaults.
    pub fn new() -> Self {
        let defaults = CsrfConfig::default();
        Self {
            default_ttl: defaults.default_ttl,
            grace_period: defaults.grace_period,
            sweep_interval: defaults.sweep_interval,
            max_token_length: defaults.max_token_length,
        }
    }

    /// Set default token validity.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set default token validity in minutes. Saturates on overflow.
    pub fn default_ttl_minutes(self, minutes: u64) -> Self {
        self.default_ttl(Duration::from_secs(minutes.saturating_mul(60)))
    }

    /// Set post-consumption grace window.
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Set sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set longest accepted token input.
    pub fn max_token_length(mut self, length: usize) -> Self {
        self.max_token_length = length;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<CsrfConfig, CsrfError> {
        if self.default_ttl.is_zero() {
            return Err(CsrfError::Configuration(ConfigurationError::InvalidDuration {
                field: "default_ttl".to_string(),
            }));
        }

        if self.sweep_interval.is_zero() {
            return Err(CsrfError::Configuration(ConfigurationError::InvalidDuration {
                field: "sweep_interval".to_string(),
            }));
        }

        if self.max_token_length == 0 {
            return Err(CsrfError::Configuration(ConfigurationError::InvalidLength {
                field: "max_token_length".to_string(),
                value: self.max_token_length,
            }));
        }

        Ok(CsrfConfig {
            default_ttl: self.default_ttl,
            grace_period: self.grace_period,
            sweep_interval: self.sweep_interval,
            max_token_length: self.max_token_length,
        })
    }
}

impl Default for CsrfConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new CSRF configuration builder.
pub fn csrf_config() -> CsrfConfigBuilder {
    CsrfConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_builder_defaults() {
        let config = assert_ok!(csrf_config().build());
        assert_eq!(config, CsrfConfig::default());
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
        assert_eq!(config.grace_period, Duration::from_secs(5));
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_builder_overrides() {
        let config = csrf_config()
            .default_ttl_minutes(15)
            .grace_period(Duration::from_secs(2))
            .sweep_interval(Duration::from_secs(30))
            .max_token_length(128)
            .build()
            .unwrap();

        assert_eq!(config.default_ttl, Duration::from_secs(900));
        assert_eq!(config.grace_ms(), 2_000);
        assert_eq!(config.max_token_length, 128);
    }

    #[test]
    fn test_huge_ttl_minutes_saturates() {
        let config = assert_ok!(csrf_config().default_ttl_minutes(u64::MAX / 30).build());
        assert_eq!(config.default_ttl, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_builder_rejects_zero_ttl() {
        let result = csrf_config().default_ttl(Duration::ZERO).build();
        assert!(matches!(
            result,
            Err(CsrfError::Configuration(ConfigurationError::InvalidDuration { .. }))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_sweep_interval() {
        assert_err!(csrf_config().sweep_interval(Duration::ZERO).build());
    }

    #[test]
    fn test_builder_rejects_zero_length() {
        assert_err!(csrf_config().max_token_length(0).build());
    }

    #[test]
    fn test_builder_allows_zero_grace() {
        let config = csrf_config().grace_period(Duration::ZERO).build().unwrap();
        assert_eq!(config.grace_ms(), 0);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CsrfConfig =
            serde_json::from_str(r#"{"max_token_length": 64}"#).unwrap();
        assert_eq!(config.max_token_length, 64);
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
    }
}
