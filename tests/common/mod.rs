//! Common test utilities for integration tests.
//!
//! Wires a controller to the in-memory doubles from
//! `ticketpass::adapters::mock`. Every test using the rig runs under
//! `#[tokio::test(start_paused = true)]`; the mock clock follows tokio's
//! virtual clock, so timings below are exact.
//!
//! # Example
//!
//! ```ignore
//! let rig = RigBuilder::new().script(ScriptedFetch::ticket(60)).spawn();
//! let start = Instant::now();
//! rig.handle.request_initial_load().unwrap();
//! at(start, 801).await;
//! assert_eq!(rig.handle.state().phase(), Phase::Active);
//! ```

#![allow(dead_code)]

pub mod rig;

pub use rig::*;

use std::time::Duration;

use tokio::time::Instant;

/// Sleep until `ms` milliseconds after `start` on the virtual clock.
///
/// Auto-advance only moves time once every task is idle, so all work
/// scheduled before this point has been processed when it returns.
pub async fn at(start: Instant, ms: u64) {
    tokio::time::sleep_until(start + Duration::from_millis(ms)).await;
}

/// Let the controller process everything already queued.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
