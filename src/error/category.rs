//! Error category classification for the ticket lifecycle.
//!
//! Categories decide how a failure surfaces: as a phase transition the
//! user sees, as a silent internal retry, or not at all.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network or backend failure while fetching a ticket.
    /// Recoverable; surfaces the `Error` phase with a retry action.
    TransientFetch,

    /// Ticket expired on arrival or issuer/device clocks disagree.
    /// Handled internally with a delayed retry, never shown.
    ClockDrift,

    /// Screen capture detected. Not a failure but a security transition
    /// that is always shown and needs explicit re-acquire.
    Revocation,

    /// Brightness permission missing. Feature silently unavailable.
    PermissionDenied,

    /// Superseded or cancelled work. Never an error state.
    Cancelled,

    /// Brightness or capture collaborator failure. Logged and swallowed.
    Device,

    /// Invalid configuration values or files.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category reach the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ErrorCategory::TransientFetch | ErrorCategory::Revocation | ErrorCategory::Configuration
        )
    }

    /// Returns true if the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::TransientFetch | ErrorCategory::ClockDrift)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::TransientFetch => "transient_fetch",
            ErrorCategory::ClockDrift => "clock_drift",
            ErrorCategory::Revocation => "revocation",
            ErrorCategory::PermissionDenied => "permission_denied",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Device => "device",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::TransientFetch => "Check your connection and tap retry",
            ErrorCategory::ClockDrift => "A fresh ticket is requested automatically",
            ErrorCategory::Revocation => "Re-acquire the ticket without capturing the screen",
            ErrorCategory::PermissionDenied => "Allow brightness control in system settings",
            ErrorCategory::Cancelled => "No action needed",
            ErrorCategory::Device => "No action needed",
            ErrorCategory::Configuration => "Check your configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
