//! CLI module for the ticketpass demo binary.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version and usage display
//! - Parsing of interactive stdin commands
//!
//! # Usage
//!
//! ```ignore
//! use ticketpass::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! // Version and help exit here
//! let options = run_cli_command(command);
//! ```

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, ArgsError, CliCommand, RunOptions};
pub use commands::DemoCommand;
pub use version::{handle_help_command, handle_version_command, USAGE, VERSION};

/// Run a CLI command if applicable and return the options for a
/// controller run.
///
/// # Note
///
/// The `Version` and `Help` commands never return as they call
/// `std::process::exit(0)`.
pub fn run_cli_command(command: CliCommand) -> RunOptions {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => handle_help_command(),
        CliCommand::Run(options) => options,
    }
}
