//! Capability traits the lifecycle controller depends on.
//!
//! Every external collaborator sits behind one of these so the controller
//! can be driven by in-memory doubles in tests.
//!
//! # Traits
//!
//! - [`ClockSource`] - Wall-clock reading for expiry math
//! - [`CredentialFetcher`] - Ticket issuance with cooperative cancellation
//! - [`CaptureGuard`] - Capture prevention and capture event delivery
//! - [`BrightnessControl`] - Display brightness get/set
//! - [`AppLifecycle`] - Foreground/background transitions

pub mod brightness;
pub mod capture;
pub mod clock;
pub mod fetcher;
pub mod lifecycle;
pub mod subscription;

pub use brightness::{BrightnessControl, PermissionStatus, MAX_BRIGHTNESS};
pub use capture::{CaptureCallback, CaptureGuard};
pub use clock::ClockSource;
pub use fetcher::CredentialFetcher;
pub use lifecycle::{AppLifecycle, AppPresence, PresenceCallback};
pub use subscription::Subscription;
