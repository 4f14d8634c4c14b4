//! Capture revocation latch.

/// Latch tripped by a screen capture.
///
/// Once tripped it stays tripped until [`RevocationGate::reset`], which only
/// the user's retry command calls. While tripped the controller refuses
/// renewals, countdown ticks and reveals. The controller performs the
/// side effects of a trip; the gate only records it.
#[derive(Debug, Default)]
pub struct RevocationGate {
    tripped: bool,
    tripped_at: Option<i64>,
    trips: u32,
}

impl RevocationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the latch at `now_ms`. Returns true only on the first trip;
    /// tripping an already tripped gate changes nothing.
    pub fn trip(&mut self, now_ms: i64) -> bool {
        if self.tripped {
            return false;
        }
        self.tripped = true;
        self.tripped_at = Some(now_ms);
        self.trips += 1;
        true
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// When the current trip happened, in epoch milliseconds.
    pub fn tripped_at(&self) -> Option<i64> {
        self.tripped_at
    }

    /// Number of times the gate has been tripped since creation.
    pub fn trips(&self) -> u32 {
        self.trips
    }

    /// Re-arm the latch.
    pub fn reset(&mut self) {
        if self.tripped {
            tracing::info!("Revocation gate reset");
        }
        self.tripped = false;
        self.tripped_at = None;
    }
}
