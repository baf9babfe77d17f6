//! Registry configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Variable                     | Default | Meaning                              |
//! |------------------------------|---------|--------------------------------------|
//! | `EVENT_REGISTRY_CAPACITY`    | `64`    | Initial capacity of the handler map  |
//! | `EVENT_REGISTRY_LOG_FILTER`  | `info`  | Filter used when `RUST_LOG` is unset |
//! | `EVENT_REGISTRY_LOG_FORMAT`  | `text`  | `text` or `json` log output          |

use std::str::FromStr;

use crate::error::ConfigError;

const DEFAULT_CAPACITY: usize = 64;
const DEFAULT_LOG_FILTER: &str = "info";

/// Largest accepted `EVENT_REGISTRY_CAPACITY`.
pub const MAX_CAPACITY: usize = 65_536;

/// Output format of the tracing subscriber installed by
/// [`crate::telemetry::init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Top-level registry configuration.
///
/// Loaded once at startup via [`RegistryConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Number of event names the handler map is pre-sized for.
    pub initial_capacity: usize,

    /// Default tracing filter directive when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl RegistryConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first, so a `.env` file in the working
    /// directory is merged into the process environment. Use
    /// [`RegistryConfig::from_lookup`] to read variables without that side
    /// effect.
    ///
    /// # Errors
    ///
    /// See [`RegistryConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from `lookup`, which maps a variable name to its
    /// value.
    ///
    /// Falls back to defaults when a variable is missing or a numeric value
    /// cannot be parsed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLogFormat`] if `EVENT_REGISTRY_LOG_FORMAT`
    /// names an unknown format, or [`ConfigError::InvalidCapacity`] if
    /// `EVENT_REGISTRY_CAPACITY` exceeds [`MAX_CAPACITY`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let initial_capacity = parse_var(&lookup, "EVENT_REGISTRY_CAPACITY", DEFAULT_CAPACITY);
        if initial_capacity > MAX_CAPACITY {
            return Err(ConfigError::InvalidCapacity(initial_capacity));
        }
        let log_filter =
            lookup("EVENT_REGISTRY_LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let log_format = match lookup("EVENT_REGISTRY_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            initial_capacity,
            log_filter,
            log_format,
        })
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
