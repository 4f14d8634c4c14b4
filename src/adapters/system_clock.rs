//! Production clock adapter.

use crate::traits::ClockSource;

/// Reads the device wall clock via chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new SystemClock.
    pub fn new() -> Self {
        Self
    }
}

impl ClockSource for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
