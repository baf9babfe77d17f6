//! Process-wide registry.
//!
//! Most code should own an [`EventRegistry`] and pass it where needed. For
//! programs that want a single registry shared by every module, this module
//! lazily builds one on first use and exposes free functions with the same
//! semantics as the methods they delegate to.

use std::sync::OnceLock;

use crate::config::RegistryConfig;
use crate::domain::{EventArg, EventRegistry};
use crate::error::{EventError, HandlerError};

static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();

/// Returns the process-wide registry, building it on first call.
///
/// The registry is sized from the `EVENT_REGISTRY_*` variables already in the
/// process environment; no `.env` file is loaded. An invalid configuration
/// falls back to the defaults.
pub fn registry() -> &'static EventRegistry {
    REGISTRY.get_or_init(|| {
        let lookup = |key: &str| std::env::var(key).ok();
        let config = RegistryConfig::from_lookup(lookup).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid event registry configuration, using defaults");
            RegistryConfig::default()
        });
        EventRegistry::from_config(&config)
    })
}

/// Subscribes `handler` to `name` on the process-wide registry.
///
/// # Panics
///
/// Panics if [`initialize`] has already been called.
pub fn subscribe<F>(name: impl Into<String>, handler: F)
where
    F: Fn(&[EventArg]) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    registry().subscribe(name, handler);
}

/// Initializes the process-wide registry.
pub fn initialize() {
    registry().initialize();
}

/// Publishes `name` on the process-wide registry.
///
/// # Errors
///
/// See [`EventRegistry::publish`].
pub fn publish(name: &str, args: &[EventArg]) -> Result<(), EventError> {
    registry().publish(name, args)
}
