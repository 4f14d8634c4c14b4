//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types from the ticketpass library,
//! providing a convenient way to import the most frequently used items.
//!
//! # Usage
//!
//! ```ignore
//! use ticketpass::prelude::*;
//! ```
//!
//! This will import:
//! - Controller types (LifecycleController, ControllerHandle, ControllerState)
//! - Model types (Ticket)
//! - Capability traits
//! - Configuration and errors

// Controller types
pub use crate::controller::{ControllerHandle, ControllerState, LifecycleController, Notice, Phase};

// Model types
pub use crate::models::Ticket;

// Capability traits
pub use crate::traits::{
    AppLifecycle, AppPresence, BrightnessControl, CaptureGuard, ClockSource, CredentialFetcher,
    Subscription,
};

// Alerts
pub use crate::notifications::Alert;

// Configuration and errors
pub use crate::config::ControllerConfig;
pub use crate::error::{FetchError, PassError, PassResult};
