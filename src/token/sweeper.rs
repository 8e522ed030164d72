//! Sweeper
//!
//! Periodic background eviction of expired tokens.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::Clock;
use crate::error::{CsrfError, SweeperError};
use crate::telemetry::{CsrfLogContext, CsrfMetrics, Logger, NoOpMetrics, TracingLogger};
use crate::token::storage::{SweepReport, TokenStore};

/// Periodic sweeper for one token store.
pub struct Sweeper {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    logger: Arc<dyn Logger>,
    metrics: Arc<dyn CsrfMetrics>,
}

impl Sweeper {
    /// Create new sweeper.
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            // tokio intervals panic on a zero period
            interval: interval.max(Duration::from_millis(1)),
            logger: Arc::new(TracingLogger),
            metrics: Arc::new(NoOpMetrics),
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

    /// Sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single sweep pass now.
    pub fn run_once(&self) -> SweepReport {
        let side = self.store.side();
        let report = self.store.sweep(self.clock.now_ms());

        if report.anomalies > 0 {
            self.logger.warn(
                "Evicted inconsistent token records",
                &CsrfLogContext::new()
                    .side(side.as_str())
                    .operation("sweep")
                    .extra("anomalies", report.anomalies),
            );
        }

        if report.removed > 0 {
            self.logger.debug(
                "Swept expired tokens",
                &CsrfLogContext::new()
                    .side(side.as_str())
                    .operation("sweep")
                    .extra("removed", report.removed),
            );
        }

        self.metrics.record_sweep(side, report.removed);
        self.metrics.set_live_tokens(side, self.store.len());
        report
    }

    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// The first sweep runs one full interval after spawning.
    pub fn spawn(self) -> Result<SweeperHandle, CsrfError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| CsrfError::Sweeper(SweeperError::NoRuntime))?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately on the first tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        self.logger.debug(
                            "Sweeper stopped",
                            &CsrfLogContext::new().side(self.store.side().as_str()),
                        );
                        break;
                    }
                    _ = ticker.tick() => {
                        if catch_unwind(AssertUnwindSafe(|| self.run_once())).is_err() {
                            self.logger.error(
                                "Sweep pass panicked; continuing",
                                &CsrfLogContext::new()
                                    .side(self.store.side().as_str())
                                    .operation("sweep"),
                            );
                        }
                    }
                }
            }
        });

        Ok(SweeperHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

/// Handle to a running sweeper.
///
/// Dropping the handle stops the sweeper. Stopping never touches stored
/// tokens.
pub struct SweeperHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Check if the sweep loop is still running.
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
            && self
                .task
                .as_ref()
                .map(|task| !task.is_finished())
                .unwrap_or(false)
    }

    /// Signal the loop to stop without waiting for it.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
