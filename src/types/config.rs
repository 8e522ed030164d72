//! Configuration Types
//!
//! Token lifecycle configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default token validity (60 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Post-consumption grace window (5 seconds).
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Sweeper interval (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Longest input accepted as a token candidate.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 512;

/// CSRF token lifecycle configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Validity of a token when the caller does not supply one.
    pub default_ttl: Duration,
    /// How long a consumed token is kept as "used" before it may vanish.
    pub grace_period: Duration,
    /// Interval between background sweeps.
    pub sweep_interval: Duration,
    /// Inputs longer than this are treated as missing.
    pub max_token_length: usize,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TOKEN_TTL,
            grace_period: DEFAULT_GRACE_PERIOD,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }
}

impl CsrfConfig {
    /// Grace window in milliseconds.
    pub fn grace_ms(&self) -> u64 {
        duration_ms(self.grace_period)
    }
}

/// Whole milliseconds in a duration, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
