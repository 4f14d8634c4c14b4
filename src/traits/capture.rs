//! Screen-capture prevention and detection abstraction.

use async_trait::async_trait;

use super::subscription::Subscription;
use crate::error::DeviceError;

/// Callback invoked when the platform reports a screen capture.
pub type CaptureCallback = Box<dyn Fn() + Send + Sync>;

/// Guards the credential against screen capture.
///
/// The resting state of the guard is unprotected; the controller enables
/// protection while it is mounted and disables it on teardown.
#[async_trait]
pub trait CaptureGuard: Send + Sync {
    /// Enable capture prevention.
    async fn protect(&self) -> Result<(), DeviceError>;

    /// Disable capture prevention.
    async fn unprotect(&self) -> Result<(), DeviceError>;

    /// Register for capture events. The callback may be invoked from any
    /// thread; dropping the returned subscription unregisters it.
    fn on_capture_event(&self, callback: CaptureCallback) -> Subscription;
}
