//! Error handling for the ticket lifecycle.
//!
//! | Category | Surfaces as | Retry |
//! |----------|-------------|-------|
//! | TransientFetch | `Error` phase with a retry action | user |
//! | ClockDrift | nothing; delayed automatic refetch | automatic |
//! | Revocation | `Revoked` phase plus an alert | user |
//! | PermissionDenied | nothing; reveal without brightness boost | - |
//! | Cancelled | nothing; result discarded | - |
//! | Device | log line only | - |
//!
//! Collaborator failures are caught at the controller boundary and mapped
//! to state transitions or silent degradation.

mod category;
mod config;
mod device;
mod fetch;
mod pass_error;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use device::DeviceError;
pub use fetch::FetchError;
pub use pass_error::{PassError, PassResult};
