//! Clock
//!
//! Wall-clock time source, injectable for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::duration_ms;

/// Time source interface.
pub trait Clock: Send + Sync {
    /// Current time in Unix milliseconds.
    fn now_ms(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        duration_ms(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        )
    }
}

/// Manually driven clock for testing.
#[derive(Debug, Default)]
pub struct MockClock {
    now_ms: AtomicU64,
}

impl MockClock {
    /// Create mock clock at the given instant.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Set the current instant.
    pub fn set(&self, now_ms: u64) -> &Self {
        self.now_ms.store(now_ms, Ordering::SeqCst);
        self
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) -> &Self {
        self.now_ms
            .fetch_add(duration_ms(by), Ordering::SeqCst);
        self
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
