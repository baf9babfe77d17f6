//! Domain layer: event arguments and the handler registry.
//!
//! This module contains the loosely typed [`EventArg`] carried by every
//! published event and the two-phase [`EventRegistry`] that stores handlers
//! and dispatches events to them.

pub mod event_arg;
pub mod event_registry;

pub use event_arg::EventArg;
pub use event_registry::{EventRegistry, Handler};
