//! Telemetry
//!
//! Observability components for token lifecycle operations.
//!
//! This module provides:
//!
//! - **Metrics**: Issuance, validation, and sweep counters
//! - **Logging**: Structured logging with context, forwarded to `tracing`

pub mod logging;
pub mod metrics;

// Metrics
pub use metrics::{
    no_op_metrics, CsrfMetrics, InMemoryMetrics, MetricEntry, MetricLabels, NoOpMetrics,
};

// Logging
pub use logging::{CsrfLogContext, InMemoryLogger, LogEntry, LogLevel, Logger, TracingLogger};
