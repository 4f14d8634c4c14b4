//! Errors from the display collaborators (brightness, capture guard).
//!
//! These never change controller state; they are logged and swallowed.

use thiserror::Error;

use super::category::ErrorCategory;

/// Failure reported by a device capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The platform refused access to the capability.
    #[error("Permission denied for {capability}")]
    PermissionDenied { capability: &'static str },

    /// The capability does not exist on this device.
    #[error("{capability} is unavailable: {message}")]
    Unavailable {
        capability: &'static str,
        message: String,
    },

    /// The call was made but failed.
    #[error("{capability} call failed: {message}")]
    Failed {
        capability: &'static str,
        message: String,
    },
}

impl DeviceError {
    /// Create a `Failed` error.
    pub fn failed(capability: &'static str, message: impl Into<String>) -> Self {
        DeviceError::Failed {
            capability,
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DeviceError::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
            DeviceError::Unavailable { .. } | DeviceError::Failed { .. } => ErrorCategory::Device,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            DeviceError::PermissionDenied { .. } => "E_DEV_PERM",
            DeviceError::Unavailable { .. } => "E_DEV_UNAVAILABLE",
            DeviceError::Failed { .. } => "E_DEV_FAILED",
        }
    }
}
