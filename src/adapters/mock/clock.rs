//! Controllable clock for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::ClockSource;

#[derive(Debug)]
struct ClockInner {
    base_millis: i64,
    origin: tokio::time::Instant,
    offset_millis: i64,
}

/// Clock that follows tokio's clock from a chosen epoch.
///
/// Under `#[tokio::test(start_paused = true)]` it advances exactly with
/// virtual time, so timers and expiry math stay in lockstep. The offset
/// jumps the wall clock without moving timers, simulating a device clock
/// change.
#[derive(Debug, Clone)]
pub struct MockClock {
    inner: Arc<Mutex<ClockInner>>,
}

impl MockClock {
    /// Create a clock reading `base_millis` now.
    pub fn new(base_millis: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClockInner {
                base_millis,
                origin: tokio::time::Instant::now(),
                offset_millis: 0,
            })),
        }
    }

    /// Jump the wall clock forward without advancing tokio time.
    pub fn jump(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.inner.lock().unwrap().offset_millis += by;
    }

    /// Set the wall clock offset in milliseconds (may be negative).
    pub fn set_offset_millis(&self, offset: i64) {
        self.inner.lock().unwrap().offset_millis = offset;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}

impl ClockSource for MockClock {
    fn now_millis(&self) -> i64 {
        let inner = self.inner.lock().unwrap();
        let elapsed = i64::try_from(inner.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        inner.base_millis + elapsed + inner.offset_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_follows_virtual_time() {
        let clock = MockClock::new(10_000);
        assert_eq!(clock.now_millis(), 10_000);

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(clock.now_millis(), 11_500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jump_and_offset() {
        let clock = MockClock::new(0);
        clock.jump(Duration::from_secs(5));
        assert_eq!(clock.now_millis(), 5_000);

        clock.set_offset_millis(-2_000);
        assert_eq!(clock.now_millis(), -2_000);
    }
}
