//! Errors raised while obtaining a ticket from the issuer.

use thiserror::Error;

use super::category::ErrorCategory;

/// Failure of a single ticket fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Could not reach the issuer.
    #[error("Connection to ticket issuer failed: {0}")]
    Connection(String),

    /// The issuer did not answer in time.
    #[error("Ticket request timed out: {0}")]
    Timeout(String),

    /// The issuer answered with a non-success status.
    #[error("Ticket issuer returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The response could not be read as a ticket.
    #[error("Malformed ticket response: {0}")]
    InvalidResponse(String),

    /// The fetch observed its cancellation token.
    #[error("Ticket fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether this failure is a cancellation rather than a real error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Connection(_) | FetchError::Timeout(_) => true,
            FetchError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            FetchError::InvalidResponse(_) | FetchError::Cancelled => false,
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        if self.is_cancelled() {
            ErrorCategory::Cancelled
        } else {
            ErrorCategory::TransientFetch
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Connection(_) => "E_FETCH_CONN",
            FetchError::Timeout(_) => "E_FETCH_TIMEOUT",
            FetchError::HttpStatus { .. } => "E_FETCH_HTTP",
            FetchError::InvalidResponse(_) => "E_FETCH_INVALID",
            FetchError::Cancelled => "E_FETCH_CANCEL",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Cancelled => "The request was cancelled.".to_string(),
            _ => "Unable to load your ticket. Please check your connection and retry.".to_string(),
        }
    }
}
