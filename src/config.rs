//! Application configuration.
//!
//! Configuration is read once at startup from environment variables; a
//! `.env` file in the working directory is loaded first if present. Every
//! variable is optional and falls back to [`AppConfig::default`].
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `APP_HOST` | bind host | `0.0.0.0` |
//! | `APP_PORT` | bind port | `3000` |
//! | `UNIQUENESS_TIMEOUT_MS` | bound on the username check | `2000` |
//! | `UNIQUENESS_MAX_JITTER_MS` | random delay of the stub username check | `300` |
//! | `RESERVED_USERNAMES` | comma-separated taken usernames | `admin` |
//! | `MAX_TASKS` | maximum number of todo items, at most 1000 | `50` |
//! | `STORE_LATENCY_MS` | simulated store latency | `0` |
//! | `LOG_FORMAT` | `text` or `json` | `text` |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::form::MAX_LIST_INDEX;

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The name of the environment variable.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'text' or 'json'")),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP server host address.
    pub app_host: String,
    /// HTTP server port.
    pub app_port: u16,
    /// Bound on a single username uniqueness check.
    pub uniqueness_timeout: Duration,
    /// Maximum random delay of the stub uniqueness check.
    pub uniqueness_max_jitter: Duration,
    /// Usernames the stub uniqueness check reports as taken.
    pub reserved_usernames: Vec<String>,
    /// Maximum number of todo items.
    pub max_tasks: usize,
    /// Simulated latency of every store operation.
    pub store_latency: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_host: "0.0.0.0".to_string(),
            app_port: 3000,
            uniqueness_timeout: Duration::from_millis(2000),
            uniqueness_max_jitter: Duration::from_millis(300),
            reserved_usernames: vec!["admin".to_string()],
            max_tasks: 50,
            store_latency: Duration::ZERO,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors if file doesn't exist)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup` instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            app_host: read("APP_HOST").unwrap_or(defaults.app_host),
            app_port: parsed(read("APP_PORT"), "APP_PORT", defaults.app_port)?,
            uniqueness_timeout: millis(
                read("UNIQUENESS_TIMEOUT_MS"),
                "UNIQUENESS_TIMEOUT_MS",
                defaults.uniqueness_timeout,
            )?,
            uniqueness_max_jitter: millis(
                read("UNIQUENESS_MAX_JITTER_MS"),
                "UNIQUENESS_MAX_JITTER_MS",
                defaults.uniqueness_max_jitter,
            )?,
            reserved_usernames: read("RESERVED_USERNAMES").map_or(
                defaults.reserved_usernames,
                |names| {
                    names
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(ToString::to_string)
                        .collect()
                },
            ),
            max_tasks: max_tasks(read("MAX_TASKS"), defaults.max_tasks)?,
            store_latency: millis(
                read("STORE_LATENCY_MS"),
                "STORE_LATENCY_MS",
                defaults.store_latency,
            )?,
            log_format: parsed(read("LOG_FORMAT"), "LOG_FORMAT", defaults.log_format)?,
        })
    }

    /// Returns the `host:port` address to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parsed<T>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.map_or(Ok(default), |value| {
        value.trim().parse().map_err(|error: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: error.to_string(),
        })
    })
}

fn max_tasks(value: Option<String>, default: usize) -> Result<usize, ConfigError> {
    let limit = MAX_LIST_INDEX + 1;
    let max_tasks = parsed(value, "MAX_TASKS", default)?;
    if max_tasks > limit {
        return Err(ConfigError::InvalidValue {
            key: "MAX_TASKS".to_string(),
            message: format!("{max_tasks} exceeds the limit of {limit}"),
        });
    }
    Ok(max_tasks)
}

fn millis(value: Option<String>, key: &str, default: Duration) -> Result<Duration, ConfigError> {
    value.map_or(Ok(default), |value| {
        parsed(Some(value), key, 0).map(Duration::from_millis)
    })
}
