//! Receiving Side
//!
//! Holds tokens handed over by a remote issuer. Cannot mint.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{is_well_formed, Clock, SystemClock};
use crate::error::{CsrfError, CsrfResult, TokenError};
use crate::telemetry::{CsrfMetrics, Logger};
use crate::token::{create_receiving_store, ReceivingStore, SweepReport, TokenLifecycle};
use crate::types::{CsrfConfig, ValidationOutcome};

/// Token receiver.
pub struct CsrfReceiver {
    lifecycle: TokenLifecycle<ReceivingStore>,
}

impl CsrfReceiver {
    /// Create receiver with the system clock.
    pub fn new(config: CsrfConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create receiver with an explicit clock.
    pub fn with_clock(config: CsrfConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            lifecycle: TokenLifecycle::new(create_receiving_store(clock.clone()), clock, config),
        }
    }

    /// Set logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.lifecycle = self.lifecycle.with_logger(logger);
        self
    }

    /// Set metrics.
    pub fn with_metrics(mut self, metrics: Arc<dyn CsrfMetrics>) -> Self {
        self.lifecycle = self.lifecycle.with_metrics(metrics);
        self
    }

    /// Store a handed-over token for the configured default TTL.
    pub fn accept(&self, token: &str) -> CsrfResult<()> {
        self.accept_with_ttl(token, self.lifecycle.config().default_ttl)
    }

    /// Store a handed-over token valid for `ttl`.
    pub fn accept_with_ttl(&self, token: &str, ttl: Duration) -> CsrfResult<()> {
        if !is_well_formed(token, self.lifecycle.config().max_token_length) {
            return Err(CsrfError::Token(TokenError::Malformed));
        }

        self.lifecycle.register(token, ttl);
        Ok(())
    }

    /// Validate a presented token.
    pub fn validate(&self, token: Option<&str>, consume: bool) -> ValidationOutcome {
        self.lifecycle.validate(token, consume)
    }

    /// Validate and consume a presented token.
    pub fn validate_token(&self, token: &str) -> ValidationOutcome {
        self.lifecycle.validate(Some(token), true)
    }

    /// Start the background sweeper.
    pub fn start_sweeper(&self) -> CsrfResult<()> {
        self.lifecycle.start_sweeper()
    }

    /// Stop the background sweeper.
    pub fn stop(&self) -> bool {
        self.lifecycle.stop()
    }

    /// Sweep expired tokens immediately.
    pub fn sweep_now(&self) -> SweepReport {
        self.lifecycle.sweep_now()
    }

    /// Number of tokens held.
    pub fn live_tokens(&self) -> usize {
        self.lifecycle.live_tokens()
    }

    /// Shared lifecycle policy.
    pub fn lifecycle(&self) -> &TokenLifecycle<ReceivingStore> {
        &self.lifecycle
    }
}

impl Default for CsrfReceiver {
    fn default() -> Self {
        Self::new(CsrfConfig::default())
    }
}
