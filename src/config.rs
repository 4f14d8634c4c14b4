//! Controller configuration.
//!
//! Use the builder methods to customize timings, or load from the
//! environment / a JSON file.
//!
//! # Example
//!
//! ```ignore
//! use ticketpass::config::ControllerConfig;
//! use std::time::Duration;
//!
//! let config = ControllerConfig::default()
//!     .with_tick_interval(Duration::from_millis(250))
//!     .with_endpoint("https://tickets.example.com/v1/ticket");
//! config.validate()?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest countdown tick the controller accepts. Renewal is driven from
/// the tick, so it must stay sub-second relative to the displayed seconds.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Timings and backend settings for the ticket lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Countdown recompute period (default: 200ms)
    #[serde(with = "millis")]
    pub tick_interval: Duration,
    /// Tickets with this many whole seconds or fewer left on arrival are
    /// treated as drifted / expired on arrival (default: 2)
    pub drift_threshold_secs: i64,
    /// Delay before refetching after a drifted ticket (default: 3s)
    #[serde(with = "millis")]
    pub drift_retry_delay: Duration,
    /// On resume, renew if the ticket expires within this margin (default: 2s)
    #[serde(with = "millis")]
    pub resume_safety_margin: Duration,
    /// Debounce between release and hide (default: 500ms)
    #[serde(with = "millis")]
    pub reveal_hide_delay: Duration,
    /// Ticket issuer URL; the simulated backend is used when absent
    pub endpoint: Option<String>,
    /// Bearer token sent to the issuer
    pub auth_token: Option<String>,
    /// HTTP request timeout for the issuer (default: 10s)
    #[serde(with = "millis")]
    pub request_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            drift_threshold_secs: 2,
            drift_retry_delay: Duration::from_millis(3000),
            resume_safety_margin: Duration::from_millis(2000),
            reveal_hide_delay: Duration::from_millis(500),
            endpoint: None,
            auth_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ControllerConfig {
    /// Create a new ControllerConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the countdown tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the drift guard threshold in whole seconds.
    pub fn with_drift_threshold_secs(mut self, secs: i64) -> Self {
        self.drift_threshold_secs = secs;
        self
    }

    /// Set the delayed retry used after a drifted ticket.
    pub fn with_drift_retry_delay(mut self, delay: Duration) -> Self {
        self.drift_retry_delay = delay;
        self
    }

    /// Set the resume staleness margin.
    pub fn with_resume_safety_margin(mut self, margin: Duration) -> Self {
        self.resume_safety_margin = margin;
        self
    }

    /// Set the reveal hide debounce.
    pub fn with_reveal_hide_delay(mut self, delay: Duration) -> Self {
        self.reveal_hide_delay = delay;
        self
    }

    /// Set the ticket issuer URL.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Set the bearer token for the issuer.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resume margin in milliseconds, for comparison with epoch timestamps.
    pub fn resume_margin_millis(&self) -> i64 {
        i64::try_from(self.resume_safety_margin.as_millis()).unwrap_or(i64::MAX)
    }

    /// Check the values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.tick_interval > MAX_TICK_INTERVAL {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval",
                message: format!("must be at most {:?}", MAX_TICK_INTERVAL),
            });
        }
        if self.drift_retry_delay.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "drift_retry_delay",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.drift_threshold_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "drift_threshold_secs",
                message: "must not be negative".to_string(),
            });
        }
        if let Some(ref endpoint) = self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: "endpoint",
                    message: format!("'{}' is not an http(s) URL", endpoint),
                });
            }
        }
        Ok(())
    }

    /// Create config from `TICKETPASS_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = env_millis("TICKETPASS_TICK_MS")? {
            config.tick_interval = ms;
        }
        if let Some(value) = env_var("TICKETPASS_DRIFT_THRESHOLD_SECS") {
            config.drift_threshold_secs =
                value.parse().map_err(|_| ConfigError::InvalidEnv {
                    name: "TICKETPASS_DRIFT_THRESHOLD_SECS",
                    value,
                })?;
        }
        if let Some(ms) = env_millis("TICKETPASS_DRIFT_RETRY_MS")? {
            config.drift_retry_delay = ms;
        }
        if let Some(ms) = env_millis("TICKETPASS_RESUME_MARGIN_MS")? {
            config.resume_safety_margin = ms;
        }
        if let Some(ms) = env_millis("TICKETPASS_REVEAL_HIDE_MS")? {
            config.reveal_hide_delay = ms;
        }
        if let Some(ms) = env_millis("TICKETPASS_REQUEST_TIMEOUT_MS")? {
            config.request_timeout = ms;
        }
        config.endpoint = env_var("TICKETPASS_ENDPOINT");
        config.auth_token = env_var("TICKETPASS_TOKEN");

        config.validate()?;
        Ok(config)
    }

    /// Load config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_millis(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env_var(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
        None => Ok(None),
    }
}

/// Durations as integer milliseconds in config files.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
