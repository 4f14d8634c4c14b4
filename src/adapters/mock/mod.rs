//! Mock and in-memory implementations of the capability traits.
//!
//! Used by the test suite, and by the headless binary as stand-ins for
//! real display hardware.
//!
//! # Available Mocks
//!
//! - [`MockClock`] - Clock following tokio time, with manual jumps
//! - [`MockFetcher`] - Scripted ticket issuer
//! - [`InMemoryCaptureGuard`] - Capture guard with manual event trigger
//! - [`InMemoryBrightness`] - Stored brightness level with call history
//! - [`ManualLifecycle`] - Hand-emitted foreground/background events

pub mod brightness;
pub mod capture;
pub mod clock;
pub mod fetcher;
pub mod lifecycle;

pub use brightness::InMemoryBrightness;
pub use capture::InMemoryCaptureGuard;
pub use clock::MockClock;
pub use fetcher::{MockFetcher, ScriptedFetch, ScriptedOutcome};
pub use lifecycle::ManualLifecycle;
