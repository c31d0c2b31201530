//! Process configuration read from the environment.

use std::{fmt, str::FromStr};

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including per-operation store events.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Skipped or degraded operations.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// The directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::LogLevel(other.to_string())),
        }
    }
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `VALKEY_PORT` is not an integer.
    #[error("VALKEY_PORT must be a valid number, got {0:?}")]
    PortNotNumeric(String),

    /// `VALKEY_PORT` is outside 1-65535.
    #[error("VALKEY_PORT must be between 1 and 65535, got {0}")]
    PortOutOfRange(i64),

    /// `LOG_LEVEL` is not one of the supported levels.
    #[error("LOG_LEVEL must be one of: debug, info, warn, error; got {0:?}")]
    LogLevel(String),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Valkey host name (`VALKEY_HOST`, default `localhost`).
    pub valkey_host: String,
    /// Valkey port (`VALKEY_PORT`, default `6379`).
    pub valkey_port: u16,
    /// Log verbosity (`LOG_LEVEL`, default `info`).
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            valkey_host: "localhost".to_string(),
            valkey_port: 6379,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Unset and empty variables
    /// fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let valkey_port = match get("VALKEY_PORT") {
            Some(raw) => parse_port(&raw)?,
            None => defaults.valkey_port,
        };
        let log_level = match get("LOG_LEVEL") {
            Some(raw) => raw.parse()?,
            None => defaults.log_level,
        };

        Ok(Self {
            valkey_host: get("VALKEY_HOST").unwrap_or(defaults.valkey_host),
            valkey_port,
            log_level,
        })
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let port: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::PortNotNumeric(raw.to_string()))?;
    u16::try_from(port)
        .ok()
        .filter(|&port| port != 0)
        .ok_or(ConfigError::PortOutOfRange(port))
}
