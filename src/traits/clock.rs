//! Wall-clock abstraction used for all expiry math.

/// Source of the current wall-clock time in epoch milliseconds.
///
/// Ticket expiry is an absolute timestamp from the issuer's clock, so every
/// countdown computation reads this clock afresh. Isolated behind a trait
/// so drift handling can be tested against a controllable clock.
pub trait ClockSource: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}
