//! Registry error types.
//!
//! [`EventError`] is returned by [`crate::EventRegistry::publish`]. It covers
//! the two recoverable runtime conditions: publishing before activation and a
//! handler reporting failure. Registration after activation is not an error
//! value at all; it panics (see [`crate::EventRegistry::subscribe`]).
//!
//! [`ConfigError`] covers invalid configuration values read from the
//! environment.

/// Error type returned by event handlers.
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it through
/// `?`, and ad-hoc failures can be built with [`anyhow::anyhow!`].
pub type HandlerError = anyhow::Error;

/// Recoverable error returned by [`crate::EventRegistry::publish`].
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Publish was called before the registry was initialized.
    #[error("the event subsystem is not initialized")]
    NotInitialized,

    /// A handler failed; the remaining handlers for that publish were skipped.
    ///
    /// Displays exactly as the handler's own error.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl EventError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::NotInitialized => 2001,
            Self::Handler(_) => 4001,
        }
    }

    /// Returns the handler's error if this is a handler failure.
    #[must_use]
    pub const fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            Self::Handler(err) => Some(err),
            Self::NotInitialized => None,
        }
    }

    /// Consumes the error, returning the handler's error if this is a
    /// handler failure.
    #[must_use]
    pub fn into_handler_error(self) -> Option<HandlerError> {
        match self {
            Self::Handler(err) => Some(err),
            Self::NotInitialized => None,
        }
    }

    /// Returns `true` if publish was rejected because the registry was not
    /// yet initialized.
    #[must_use]
    pub const fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }
}

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `EVENT_REGISTRY_LOG_FORMAT` was set to something other than `text`
    /// or `json`.
    #[error("invalid log format: {0} (expected \"text\" or \"json\")")]
    InvalidLogFormat(String),

    /// `EVENT_REGISTRY_CAPACITY` exceeds [`crate::config::MAX_CAPACITY`].
    #[error("invalid capacity: {0} (maximum {max})", max = crate::config::MAX_CAPACITY)]
    InvalidCapacity(usize),

    /// The log filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
}
