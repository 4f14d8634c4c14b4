//! Ticketpass - lifecycle controller for short-lived, screen-displayed
//! access tickets.
//!
//! This library exposes modules for use in integration tests and by
//! platform glue.

pub mod adapters;
pub mod cli;
pub mod cli_output;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod notifications;
pub mod prelude;
pub mod traits;
