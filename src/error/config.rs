//! Configuration loading and validation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while building a [`crate::config::ControllerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value the controller cannot run with.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// An environment variable could not be parsed.
    #[error("Environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the config schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "E_CFG_VALUE",
            ConfigError::InvalidEnv { .. } => "E_CFG_ENV",
            ConfigError::Read { .. } => "E_CFG_READ",
            ConfigError::Parse(_) => "E_CFG_PARSE",
        }
    }
}
