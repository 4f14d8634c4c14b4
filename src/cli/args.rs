//! Command-line argument parsing for the ticketpass demo.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

use thiserror::Error;

/// Options for a controller run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Ticket issuer URL; overrides `TICKETPASS_ENDPOINT`
    pub endpoint: Option<String>,
    /// Skew applied to the simulated issuer's clock
    pub skew_ms: i64,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Run the controller (default)
    Run(RunOptions),
}

/// Errors from argument parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("unknown argument '{0}'")]
    Unknown(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use ticketpass::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ticketpass".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut options = RunOptions::default();
    // Skip the program name
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--endpoint" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--endpoint"))?;
                options.endpoint = Some(value);
            }
            "--skew-ms" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--skew-ms"))?;
                options.skew_ms = value.parse().map_err(|_| ArgsError::InvalidValue {
                    flag: "--skew-ms",
                    value,
                })?;
            }
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }
    Ok(CliCommand::Run(options))
}
