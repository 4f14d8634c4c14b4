//! Display brightness abstraction.
//!
//! Brightness is a best-effort UX enhancement: every call is fallible and
//! the controller logs and swallows failures.

use async_trait::async_trait;

use crate::error::DeviceError;

/// Full display brightness.
pub const MAX_BRIGHTNESS: f32 = 1.0;

/// Platform permission state for brightness control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Brightness may be changed
    Granted,
    /// The user refused
    Denied,
    /// Not asked yet
    Undetermined,
}

impl PermissionStatus {
    /// Whether brightness may be changed.
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Reads and drives the device display brightness (0.0 to 1.0).
#[async_trait]
pub trait BrightnessControl: Send + Sync {
    /// Current permission state, without prompting.
    async fn get_permission(&self) -> Result<PermissionStatus, DeviceError>;

    /// Ask the platform for permission (may prompt the user).
    async fn request_permission(&self) -> Result<PermissionStatus, DeviceError>;

    /// Current brightness level.
    async fn get_current(&self) -> Result<f32, DeviceError>;

    /// Set the brightness level.
    async fn set_level(&self, level: f32) -> Result<(), DeviceError>;
}
