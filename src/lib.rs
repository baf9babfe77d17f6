//! # event-registry
//!
//! Two-phase, in-process publish/subscribe registry.
//!
//! Handlers are attached to named events during startup, the registry is
//! then initialized exactly once, and from that point events are published
//! synchronously to their handlers in subscription order.
//!
//! ## Lifecycle
//!
//! ```text
//! UNINITIALIZED ── initialize() ──► ACTIVATED
//!   subscribe(): ok                   subscribe(): panic
//!   publish():   Err(NotInitialized)  publish():   dispatch
//! ```
//!
//! - A handler error stops the dispatch and is returned to the publisher.
//! - Publishing an event with no handlers succeeds and does nothing.
//! - Publishing takes no lock; the handler map is frozen at initialization.
//!
//! ## Example
//!
//! ```
//! use event_registry::{EventError, EventRegistry, event_args};
//!
//! # fn main() -> Result<(), EventError> {
//! let registry = EventRegistry::new();
//! registry.subscribe("user.created", |args| {
//!     let name = args.first().and_then(|arg| arg.as_str()).unwrap_or_default();
//!     println!("welcome, {name}");
//!     Ok(())
//! });
//! registry.initialize();
//!
//! registry.publish("user.created", &event_args!["alice"])?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod global;
pub mod telemetry;

pub use config::{LogFormat, RegistryConfig};
pub use domain::{EventArg, EventRegistry, Handler};
pub use error::{ConfigError, EventError, HandlerError};
