//! Unified error type for the ticketpass crate.

use thiserror::Error;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::device::DeviceError;
use super::fetch::FetchError;

/// Unified error type.
///
/// Collaborator failures never cross the controller boundary as errors;
/// this type is what the public API (handles, config, adapters) returns.
#[derive(Debug, Error)]
pub enum PassError {
    /// Ticket fetch failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Brightness or capture guard failure.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The controller task has shut down and no longer accepts commands.
    #[error("Ticket controller is no longer running")]
    ControllerClosed,
}

impl PassError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            PassError::Fetch(err) => err.category(),
            PassError::Device(err) => err.category(),
            PassError::Config(_) => ErrorCategory::Configuration,
            PassError::ControllerClosed => ErrorCategory::Cancelled,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            PassError::Fetch(err) => err.error_code(),
            PassError::Device(err) => err.error_code(),
            PassError::Config(err) => err.error_code(),
            PassError::ControllerClosed => "E_CTRL_CLOSED",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            PassError::Fetch(err) => err.user_message(),
            PassError::Device(_) => "A display feature is unavailable on this device.".to_string(),
            PassError::Config(err) => format!("Configuration problem: {}", err),
            PassError::ControllerClosed => "The ticket screen has been closed.".to_string(),
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

/// Type alias for Results using PassError.
pub type PassResult<T> = Result<T, PassError>;
