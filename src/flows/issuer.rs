//! Issuing Side
//!
//! Mints tokens and validates them against a digest-keyed store.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{Clock, DefaultTokenCodec, SystemClock, TokenCodec};
use crate::error::CsrfResult;
use crate::telemetry::{CsrfLogContext, CsrfMetrics, Logger};
use crate::token::{DigestKeys, IssuingStore, SweepReport, TokenLifecycle, TokenStore};
use crate::types::{CsrfConfig, Side, Token, TokenRecord, ValidationOutcome};

/// Token issuer.
pub struct CsrfIssuer {
    codec: Arc<dyn TokenCodec>,
    lifecycle: TokenLifecycle<IssuingStore>,
}

impl CsrfIssuer {
    /// Create issuer with the system clock and OS random source.
    pub fn new(config: CsrfConfig) -> Self {
        Self::with_components(config, Arc::new(DefaultTokenCodec::new()), Arc::new(SystemClock))
    }

    /// Create issuer with explicit codec and clock.
    pub fn with_components(
        config: CsrfConfig,
        codec: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = IssuingStore::new(DigestKeys::new(codec.clone()), clock.clone());
        Self {
            codec,
            lifecycle: TokenLifecycle::new(store, clock, config),
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

    /// Issue a token valid for the configured default TTL.
    pub fn issue(&self) -> CsrfResult<Token> {
        self.issue_with_ttl(self.lifecycle.config().default_ttl)
    }

    /// Issue a token valid for `ttl`.
    ///
    /// Fails only when the random source cannot be read.
    pub fn issue_with_ttl(&self, ttl: Duration) -> CsrfResult<Token> {
        let token = self.codec.mint().map_err(|e| {
            self.lifecycle.metrics().record_error(Side::Issuer, e.error_code());
            self.lifecycle.logger().error(
                "Token minting failed",
                &CsrfLogContext::new()
                    .side(Side::Issuer.as_str())
                    .operation("issue")
                    .extra("error", &e),
            );
            e
        })?;

        self.lifecycle.register(token.expose(), ttl);
        Ok(token)
    }

    /// Validate a presented token.
    pub fn validate(&self, token: Option<&str>, consume: bool) -> ValidationOutcome {
        self.lifecycle.validate(token, consume)
    }

    /// Validate and consume a presented token.
    pub fn validate_token(&self, token: &str) -> ValidationOutcome {
        self.lifecycle.validate(Some(token), true)
    }

    /// Look up a token's record without touching it.
    pub fn inspect(&self, token: &str) -> Option<TokenRecord> {
        self.lifecycle.store().get(token)
    }

    /// Revoke a token before it is used.
    pub fn revoke(&self, token: &str) -> bool {
        self.lifecycle.store().delete(token)
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
    pub fn lifecycle(&self) -> &TokenLifecycle<IssuingStore> {
        &self.lifecycle
    }
}

impl Default for CsrfIssuer {
    fn default() -> Self {
        Self::new(CsrfConfig::default())
    }
}
