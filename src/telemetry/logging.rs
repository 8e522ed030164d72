//! Logging
//!
//! Structured log events for token lifecycle operations. Events carry at
//! most a short digest prefix, never a plaintext token.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Clock, SystemClock};

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Fields attached to a log event.
#[derive(Debug, Clone, Default)]
pub struct CsrfLogContext {
    /// Issuer or receiver.
    pub side: Option<String>,
    /// Operation name.
    pub operation: Option<String>,
    /// Rejection reason.
    pub reason: Option<String>,
    /// Token digest prefix for correlation.
    pub digest: Option<String>,
    /// Additional fields, ordered by key.
    pub extra: BTreeMap<String, String>,
}

impl CsrfLogContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(side.into());
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.extra.insert(key.into(), value.to_string());
        self
    }

    /// Check whether any field value contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        [&self.side, &self.operation, &self.reason, &self.digest]
            .into_iter()
            .flatten()
            .chain(self.extra.values())
            .any(|value| value.contains(needle))
    }

    fn extra_fields(&self) -> String {
        self.extra
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sink for lifecycle log events.
///
/// Implementors provide `log` and `is_enabled`; the per-level helpers
/// forward to `log`.
pub trait Logger: Send + Sync {
    /// Record one event.
    fn log(&self, level: LogLevel, message: &str, context: &CsrfLogContext);

    /// Check whether events at `level` would be recorded.
    fn is_enabled(&self, level: LogLevel) -> bool;

    fn debug(&self, message: &str, context: &CsrfLogContext) {
        self.log(LogLevel::Debug, message, context);
    }

    fn info(&self, message: &str, context: &CsrfLogContext) {
        self.log(LogLevel::Info, message, context);
    }

    fn warn(&self, message: &str, context: &CsrfLogContext) {
        self.log(LogLevel::Warn, message, context);
    }

    fn error(&self, message: &str, context: &CsrfLogContext) {
        self.log(LogLevel::Error, message, context);
    }
}

/// Logger that forwards to `tracing` events.
///
/// Level filtering is left to the installed subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

macro_rules! emit {
    ($level:ident, $message:expr, $context:expr) => {
        tracing::$level!(
            side = $context.side.as_deref().unwrap_or("-"),
            operation = $context.operation.as_deref().unwrap_or("-"),
            reason = $context.reason.as_deref().unwrap_or("-"),
            digest = $context.digest.as_deref().unwrap_or("-"),
            extra = %$context.extra_fields(),
            "{}",
            $message
        )
    };
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, context: &CsrfLogContext) {
        // tracing callsites need a constant level
        match level {
            LogLevel::Debug => emit!(debug, message, context),
            LogLevel::Info => emit!(info, message, context),
            LogLevel::Warn => emit!(warn, message, context),
            LogLevel::Error => emit!(error, message, context),
        }
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Debug => tracing::enabled!(tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(tracing::Level::ERROR),
        }
    }
}

/// Recorded log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub context: CsrfLogContext,
    /// Clock reading when the event was recorded (Unix ms).
    pub at_ms: u64,
}

/// Logger that keeps events in memory, for assertions in tests.
pub struct InMemoryLogger {
    events: Mutex<Vec<LogEntry>>,
    threshold: LogLevel,
    clock: Arc<dyn Clock>,
}

impl InMemoryLogger {
    /// Record every event.
    pub fn new() -> Self {
        Self::with_threshold(LogLevel::Debug)
    }

    /// Record events at `threshold` or above.
    pub fn with_threshold(threshold: LogLevel) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            threshold,
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp events from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.events.lock().clone()
    }

    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Check whether any recorded message or field contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.message.contains(needle) || e.context.mentions(needle))
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for InMemoryLogger {
    fn log(&self, level: LogLevel, message: &str, context: &CsrfLogContext) {
        if !self.is_enabled(level) {
            return;
        }
        let at_ms = self.clock.now_ms();
        self.events.lock().push(LogEntry {
            level,
            message: message.to_string(),
            context: context.clone(),
            at_ms,
        });
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }
}
