//! Token Lifecycle
//!
//! Issuance defaults, single-use validation, and sweeper ownership shared by
//! both sides of the protocol.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{digest_token, is_well_formed, Clock};
use crate::error::CsrfResult;
use crate::telemetry::{CsrfLogContext, CsrfMetrics, LogLevel, Logger, NoOpMetrics, TracingLogger};
use crate::token::storage::{Redemption, SweepReport, TokenStore};
use crate::token::sweeper::{Sweeper, SweeperHandle};
use crate::types::{duration_ms, CsrfConfig, RejectReason, ValidationOutcome};

/// Lifecycle policy over a single token store.
///
/// The store is only ever reached through this value (and the sweeper it
/// owns), so every validation sees the same state.
pub struct TokenLifecycle<S: TokenStore + 'static> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: CsrfConfig,
    logger: Arc<dyn Logger>,
    metrics: Arc<dyn CsrfMetrics>,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl<S: TokenStore + 'static> TokenLifecycle<S> {
    /// Create new lifecycle over a store.
    pub fn new(store: S, clock: Arc<dyn Clock>, config: CsrfConfig) -> Self {
        Self {
            store: Arc::new(store),
            clock,
            config,
            logger: Arc::new(TracingLogger),
            metrics: Arc::new(NoOpMetrics),
            sweeper: Mutex::new(None),
        }
    }

    /// Set logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set metrics.
    pub fn with_metrics(mut self, metrics: Arc<dyn CsrfMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Configuration in effect.
    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub(crate) fn metrics(&self) -> &dyn CsrfMetrics {
        self.metrics.as_ref()
    }

    /// Record a token valid for `ttl` from now. Returns its expiry (Unix ms).
    pub fn register(&self, token: &str, ttl: Duration) -> u64 {
        let expires_at = self.clock.now_ms().saturating_add(duration_ms(ttl));
        self.store.put(token, expires_at);

        let side = self.store.side();
        self.metrics.record_issued(side);
        if self.logger.is_enabled(LogLevel::Debug) {
            self.logger.debug(
                "Token registered",
                &CsrfLogContext::new()
                    .side(side.as_str())
                    .operation("register")
                    .digest(digest_token(token).short())
                    .extra("ttl_secs", ttl.as_secs()),
            );
        }

        expires_at
    }

    /// Validate a presented token, consuming it unless `consume` is false.
    ///
    /// Never fails: every rejection is a structured outcome.
    pub fn validate(&self, token: Option<&str>, consume: bool) -> ValidationOutcome {
        let outcome = match token {
            Some(candidate) if is_well_formed(candidate, self.config.max_token_length) => {
                let now = self.clock.now_ms();
                match self
                    .store
                    .redeem(candidate, now, consume, self.config.grace_ms())
                {
                    Redemption::Accepted => ValidationOutcome::accepted(),
                    Redemption::NotFound => ValidationOutcome::rejected(RejectReason::Invalid),
                    Redemption::Expired => ValidationOutcome::rejected(RejectReason::Expired),
                    Redemption::AlreadyUsed => {
                        ValidationOutcome::rejected(RejectReason::AlreadyUsed)
                    }
                }
            }
            _ => ValidationOutcome::rejected(RejectReason::Missing),
        };

        self.observe(token, consume, &outcome);
        outcome
    }

    fn observe(&self, token: Option<&str>, consume: bool, outcome: &ValidationOutcome) {
        let side = self.store.side();
        self.metrics.record_validation(side, outcome.reason);

        if !self.logger.is_enabled(LogLevel::Debug) {
            return;
        }

        let mut context = CsrfLogContext::new()
            .side(side.as_str())
            .operation("validate")
            .extra("consume", consume);
        if let Some(reason) = outcome.reason {
            context = context.reason(reason.as_str());
        }
        if let Some(t) = token.filter(|t| !t.is_empty()) {
            context = context.digest(digest_token(t).short());
        }

        if outcome.valid {
            self.logger.debug("Token accepted", &context);
        } else {
            self.logger.debug("Token rejected", &context);
        }
    }

    /// Sweep expired tokens immediately.
    pub fn sweep_now(&self) -> SweepReport {
        self.build_sweeper().run_once()
    }

    /// Number of tokens currently held.
    pub fn live_tokens(&self) -> usize {
        self.store.len()
    }

    /// Start the background sweeper on the current tokio runtime.
    ///
    /// No-op if one is already running.
    pub fn start_sweeper(&self) -> CsrfResult<()> {
        let mut slot = self.sweeper.lock();
        if slot.as_ref().map(SweeperHandle::is_running).unwrap_or(false) {
            return Ok(());
        }

        *slot = Some(self.build_sweeper().spawn()?);
        self.logger.info(
            "Sweeper started",
            &CsrfLogContext::new()
                .side(self.store.side().as_str())
                .extra("interval_secs", self.config.sweep_interval.as_secs()),
        );
        Ok(())
    }

    /// Stop the background sweeper. Live tokens are untouched.
    ///
    /// Returns whether a sweeper was running.
    pub fn stop(&self) -> bool {
        match self.sweeper.lock().take() {
            Some(mut handle) => {
                let was_running = handle.is_running();
                handle.stop();
                was_running
            }
            None => false,
        }
    }

    /// Check if the background sweeper is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .map(SweeperHandle::is_running)
            .unwrap_or(false)
    }

    fn build_sweeper(&self) -> Sweeper {
        Sweeper::new(
            self.store.clone(),
            self.clock.clone(),
            self.config.sweep_interval,
        )
        .with_logger(self.logger.clone())
        .with_metrics(self.metrics.clone())
    }
}
