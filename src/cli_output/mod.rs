//! CLI output utilities for the headless demo.
//!
//! This module renders controller states and alerts as plain text lines.

mod lines;

pub use lines::*;
