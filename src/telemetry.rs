//! Tracing subscriber setup.
//!
//! The registry itself only emits `tracing` events. Applications that do not
//! install their own subscriber can call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, RegistryConfig};
use crate::error::ConfigError;

/// Installs a global `fmt` subscriber configured from `config`.
///
/// `RUST_LOG` takes precedence over [`RegistryConfig::log_filter`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLogFilter`] if the fallback filter cannot be
/// parsed, or the subscriber's error if a global subscriber is already set.
pub fn init_tracing(
    config: &RegistryConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Text => builder.try_init()?,
        LogFormat::Json => builder.json().try_init()?,
    }
    Ok(())
}

fn build_filter(config: &RegistryConfig) -> Result<EnvFilter, ConfigError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(from_env.as_deref(), &config.log_filter)
}

/// Prefers a valid `directives` from the environment, else parses `fallback`.
fn filter_from(directives: Option<&str>, fallback: &str) -> Result<EnvFilter, ConfigError> {
    if let Some(filter) = directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(fallback).map_err(|err| ConfigError::InvalidLogFilter(err.to_string()))
}
