//! Metrics
//!
//! CSRF metrics collection interfaces and implementations.

use parking_lot::Mutex;
use std::collections::HashMap;

use crate::types::{RejectReason, Side};

/// Metric labels.
pub type MetricLabels = HashMap<String, String>;

/// CSRF metrics interface.
pub trait CsrfMetrics: Send + Sync {
    /// Record a token entering a store (minted or accepted).
    fn record_issued(&self, side: Side);

    /// Record a validation outcome; `None` means accepted.
    fn record_validation(&self, side: Side, reason: Option<RejectReason>);

    /// Record a sweep pass.
    fn record_sweep(&self, side: Side, removed: usize);

    /// Record an error.
    fn record_error(&self, side: Side, error_code: &str);

    /// Set live tokens gauge.
    fn set_live_tokens(&self, side: Side, count: usize);
}

/// No-op metrics implementation.
pub struct NoOpMetrics;

impl CsrfMetrics for NoOpMetrics {
    fn record_issued(&self, _side: Side) {}
    fn record_validation(&self, _side: Side, _reason: Option<RejectReason>) {}
    fn record_sweep(&self, _side: Side, _removed: usize) {}
    fn record_error(&self, _side: Side, _error_code: &str) {}
    fn set_live_tokens(&self, _side: Side, _count: usize) {}
}

/// No-op metrics singleton.
pub fn no_op_metrics() -> NoOpMetrics {
    NoOpMetrics
}

/// Metric entry for in-memory storage.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub labels: MetricLabels,
}

/// In-memory metrics for testing.
pub struct InMemoryMetrics {
    entries: Mutex<Vec<MetricEntry>>,
}

impl InMemoryMetrics {
    /// Create new in-memory metrics.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Get all recorded entries.
    pub fn get_entries(&self) -> Vec<MetricEntry> {
        self.entries.lock().clone()
    }

    /// Get entries by name.
    pub fn get_entries_by_name(&self, name: &str) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Sum of values for a metric whose label matches.
    pub fn sum_where(&self, name: &str, label: &str, value: &str) -> f64 {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.name == name && e.labels.get(label).map(String::as_str) == Some(value))
            .map(|e| e.value)
            .sum()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn record(&self, name: &str, value: f64, labels: MetricLabels) {
        self.entries.lock().push(MetricEntry {
            name: name.to_string(),
            value,
            labels,
        });
    }

    fn side_labels(side: Side) -> MetricLabels {
        let mut labels = MetricLabels::new();
        labels.insert("side".to_string(), side.as_str().to_string());
        labels
    }
}

impl Default for InMemoryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrfMetrics for InMemoryMetrics {
    fn record_issued(&self, side: Side) {
        self.record("csrf_tokens_issued_total", 1.0, Self::side_labels(side));
    }

    fn record_validation(&self, side: Side, reason: Option<RejectReason>) {
        let mut labels = Self::side_labels(side);
        labels.insert(
            "outcome".to_string(),
            reason.map(|r| r.as_str()).unwrap_or("accepted").to_string(),
        );
        self.record("csrf_validations_total", 1.0, labels);
    }

    fn record_sweep(&self, side: Side, removed: usize) {
        self.record("csrf_swept_tokens_total", removed as f64, Self::side_labels(side));
    }

    fn record_error(&self, side: Side, error_code: &str) {
        let mut labels = Self::side_labels(side);
        labels.insert("error_code".to_string(), error_code.to_string());
        self.record("csrf_errors_total", 1.0, labels);
    }

    fn set_live_tokens(&self, side: Side, count: usize) {
        self.record("csrf_live_tokens", count as f64, Self::side_labels(side));
    }
}
