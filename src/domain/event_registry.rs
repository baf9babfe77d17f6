//! Two-phase registry of named event handlers.
//!
//! [`EventRegistry`] has a setup phase, in which handlers are attached to
//! event names with [`EventRegistry::subscribe`], and a serving phase, entered
//! once through [`EventRegistry::initialize`], in which events are dispatched
//! with [`EventRegistry::publish`].
//!
//! # Concurrency
//!
//! - Subscriptions are staged in a `RwLock<HashMap<...>>`, taken in write
//!   mode by both `subscribe` and `initialize`.
//! - `initialize` moves the staged map into a write-once [`OnceLock`] and
//!   then publishes the activation flag with release ordering.
//! - `publish` checks the flag with an acquire load and reads the frozen map
//!   without locking. Handlers run on the caller's thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, PoisonError, RwLock};

use super::EventArg;
use crate::config::RegistryConfig;
use crate::error::{EventError, HandlerError};

/// Callback attached to an event name.
///
/// Receives the published arguments unchanged. Returning `Err` stops the
/// dispatch of that event and is handed back to the publisher.
pub type Handler = Box<dyn Fn(&[EventArg]) -> Result<(), HandlerError> + Send + Sync>;

type HandlerMap = HashMap<String, Vec<Handler>>;

/// Registry of handlers keyed by event name.
///
/// Handlers for one name run in the order they were subscribed. Once
/// [`initialize`](Self::initialize) has been called the set of handlers is
/// frozen for the lifetime of the registry.
pub struct EventRegistry {
    staging: RwLock<HandlerMap>,
    frozen: OnceLock<HandlerMap>,
    activated: AtomicBool,
}

impl EventRegistry {
    /// Creates an empty, not yet initialized registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty registry with room for `capacity` event names.
    ///
    /// If the space cannot be reserved the registry starts with an empty map
    /// and grows on demand.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut staging = HashMap::new();
        if let Err(err) = staging.try_reserve(capacity) {
            tracing::warn!(capacity, error = %err, "could not pre-size event registry");
        }
        Self {
            staging: RwLock::new(staging),
            frozen: OnceLock::new(),
            activated: AtomicBool::new(false),
        }
    }

    /// Creates an empty registry sized from `config`.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Appends `handler` to the handlers of `name`.
    ///
    /// # Panics
    ///
    /// Panics if the registry has already been initialized. Registering after
    /// activation means startup ran out of order, which cannot be recovered
    /// from.
    #[allow(clippy::panic)]
    pub fn subscribe<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[EventArg]) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut map = self.staging.write().unwrap_or_else(PoisonError::into_inner);
        if self.is_initialized() {
            drop(map);
            tracing::error!(
                event = %name,
                "subscribe called after the event registry was initialized"
            );
            panic!("event system is already initialized (subscribe to {name:?})");
        }
        let handlers = map.entry(name.clone()).or_default();
        handlers.push(Box::new(handler));
        tracing::debug!(event = %name, handlers = handlers.len(), "handler subscribed");
    }

    /// Freezes the registered handlers and switches the registry to serving
    /// mode.
    ///
    /// Calling it again after the first time has no effect.
    pub fn initialize(&self) {
        let mut map = self.staging.write().unwrap_or_else(PoisonError::into_inner);
        if self.is_initialized() {
            tracing::debug!("event registry already initialized");
            return;
        }
        let handlers = std::mem::take(&mut *map);
        let events = handlers.len();
        let total: usize = handlers.values().map(Vec::len).sum();
        if self.frozen.set(handlers).is_err() {
            tracing::error!("frozen handler map was already set");
        }
        self.activated.store(true, Ordering::Release);
        tracing::info!(events, handlers = total, "event registry initialized");
    }

    /// Dispatches `name` to its handlers in subscription order.
    ///
    /// An event nobody subscribed to is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::NotInitialized`] if [`initialize`](Self::initialize)
    /// has not been called yet, or [`EventError::Handler`] with the error of
    /// the first failing handler. Handlers after the failing one are not run.
    pub fn publish(&self, name: &str, args: &[EventArg]) -> Result<(), EventError> {
        if !self.is_initialized() {
            tracing::warn!(event = name, "publish before event registry initialization");
            return Err(EventError::NotInitialized);
        }
        let Some(handlers) = self.frozen.get().and_then(|map| map.get(name)) else {
            return Ok(());
        };
        tracing::trace!(
            event = name,
            handlers = handlers.len(),
            args = args.len(),
            "publishing event"
        );
        for (position, handler) in handlers.iter().enumerate() {
            if let Err(err) = handler(args) {
                tracing::debug!(event = name, position, error = %err, "event handler failed");
                return Err(EventError::Handler(err));
            }
        }
        Ok(())
    }

    /// Returns `true` once [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.activated.load(Ordering::Acquire)
    }

    /// Returns the number of handlers subscribed to `name`.
    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.with_handlers(|map| map.get(name).map_or(0, Vec::len))
    }

    /// Returns the number of distinct event names with at least one handler.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.with_handlers(HashMap::len)
    }

    fn with_handlers<R>(&self, f: impl FnOnce(&HandlerMap) -> R) -> R {
        if self.is_initialized()
            && let Some(map) = self.frozen.get()
        {
            return f(map);
        }
        let map = self.staging.read().unwrap_or_else(PoisonError::into_inner);
        f(&*map)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("initialized", &self.is_initialized())
            .field("events", &self.event_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    use crate::event_args;

    type CallLog = Arc<Mutex<Vec<(&'static str, Vec<EventArg>)>>>;

    fn recorder(
        log: &CallLog,
        tag: &'static str,
    ) -> impl Fn(&[EventArg]) -> Result<(), HandlerError> + use<> {
        let log = Arc::clone(log);
        move |args| {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((tag, args.to_vec()));
            Ok(())
        }
    }

    fn calls(log: &CallLog) -> Vec<(&'static str, Vec<EventArg>)> {
        log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        registry.subscribe("user.created", recorder(&log, "f1"));
        registry.subscribe("user.created", recorder(&log, "f2"));
        registry.initialize();

        let result = registry.publish("user.created", &event_args!["alice"]);
        assert!(result.is_ok());
        assert_eq!(
            calls(&log),
            vec![
                ("f1", vec![EventArg::from("alice")]),
                ("f2", vec![EventArg::from("alice")]),
            ]
        );
    }

    #[test]
    fn handler_error_is_returned() {
        let registry = EventRegistry::new();
        registry.subscribe("order.paid", |_| Err(anyhow::anyhow!("db down")));
        registry.initialize();

        let Err(err) = registry.publish("order.paid", &[]) else {
            panic!("expected handler failure");
        };
        assert_eq!(err.to_string(), "db down");
        assert!(err.handler_error().is_some());
    }

    #[test]
    fn first_failure_short_circuits() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        registry.subscribe("order.paid", recorder(&log, "before"));
        registry.subscribe("order.paid", |_| Err(anyhow::anyhow!("h1 failed")));
        registry.subscribe("order.paid", recorder(&log, "after"));
        registry.initialize();

        let Err(err) = registry.publish("order.paid", &[]) else {
            panic!("expected handler failure");
        };
        assert_eq!(err.to_string(), "h1 failed");
        let tags: Vec<_> = calls(&log).into_iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!["before"]);
    }

    #[test]
    fn failure_does_not_affect_other_events_or_later_publishes() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        registry.subscribe("flaky", move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::anyhow!("first attempt"))
            } else {
                Ok(())
            }
        });
        registry.subscribe("steady", recorder(&log, "steady"));
        registry.initialize();

        assert!(registry.publish("flaky", &[]).is_err());
        assert!(registry.publish("steady", &[]).is_ok());
        assert!(registry.publish("flaky", &[]).is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(calls(&log).len(), 1);
    }

    #[test]
    fn publish_before_initialize_fails() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        registry.subscribe("user.created", recorder(&log, "f1"));

        let Err(err) = registry.publish("user.created", &event_args!["alice"]) else {
            panic!("expected not initialized");
        };
        assert!(err.is_not_initialized());
        assert!(registry.publish("never.subscribed", &[]).is_err());
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn unknown_event_is_noop() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        registry.subscribe("user.created", recorder(&log, "f1"));
        registry.initialize();

        assert!(registry.publish("user.deleted", &event_args![1, 2]).is_ok());
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn initialize_without_subscriptions() {
        let registry = EventRegistry::new();
        registry.initialize();
        assert!(registry.publish("anything", &[]).is_ok());
        assert_eq!(registry.event_count(), 0);
    }

    #[test]
    fn initialize_is_idempotent() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        registry.subscribe("tick", recorder(&log, "tick"));
        registry.initialize();
        registry.initialize();

        assert!(registry.is_initialized());
        assert_eq!(registry.handler_count("tick"), 1);
        assert!(registry.publish("tick", &[]).is_ok());
        assert_eq!(calls(&log).len(), 1);
    }

    #[test]
    #[should_panic(expected = "event system is already initialized")]
    fn subscribe_after_initialize_panics() {
        let registry = EventRegistry::new();
        registry.initialize();
        registry.subscribe("late", |_| Ok(()));
    }

    #[test]
    fn args_are_passed_unchanged() {
        let registry = EventRegistry::new();
        let log = CallLog::default();
        registry.subscribe("payload", recorder(&log, "p"));
        registry.initialize();

        let args = event_args![
            "bob",
            -3_i64,
            7_u64,
            2.5,
            false,
            vec![0_u8, 1],
            serde_json::json!({ "k": "v" }),
            ()
        ];
        assert!(registry.publish("payload", &args).is_ok());
        let Some((_, received)) = calls(&log).into_iter().next() else {
            panic!("handler not invoked");
        };
        assert_eq!(received, args);
    }

    #[test]
    fn counts_track_both_phases() {
        let registry = EventRegistry::with_capacity(4);
        assert_eq!(registry.event_count(), 0);
        registry.subscribe("a", |_| Ok(()));
        registry.subscribe("a", |_| Ok(()));
        registry.subscribe("b", |_| Ok(()));
        assert_eq!(registry.handler_count("a"), 2);
        assert_eq!(registry.event_count(), 2);

        registry.initialize();
        assert_eq!(registry.handler_count("a"), 2);
        assert_eq!(registry.handler_count("b"), 1);
        assert_eq!(registry.handler_count("c"), 0);
        assert_eq!(registry.event_count(), 2);
    }

    #[test]
    fn unreservable_capacity_falls_back_to_empty_map() {
        let config = RegistryConfig {
            initial_capacity: usize::MAX,
            ..RegistryConfig::default()
        };
        let outcome = std::panic::catch_unwind(|| EventRegistry::from_config(&config));
        let Ok(registry) = outcome else {
            panic!("oversized capacity must not panic");
        };
        registry.subscribe("a", |_| Ok(()));
        registry.initialize();
        assert_eq!(registry.handler_count("a"), 1);
        assert!(registry.publish("a", &[]).is_ok());
    }

    #[test]
    fn debug_reports_state() {
        let registry = EventRegistry::new();
        registry.subscribe("a", |_| Ok(()));
        let before = format!("{registry:?}");
        assert!(before.contains("initialized: false"));
        registry.initialize();
        let after = format!("{registry:?}");
        assert!(after.contains("initialized: true"));
        assert!(after.contains("events: 1"));
    }

    #[test]
    fn concurrent_subscribe_then_concurrent_publish() {
        let registry = EventRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..16 {
                        let hits = Arc::clone(&hits);
                        registry.subscribe("shared", move |_| {
                            hits.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        });
                    }
                });
            }
        });
        assert_eq!(registry.handler_count("shared"), 128);

        registry.initialize();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..10 {
                        assert!(registry.publish("shared", &[]).is_ok());
                    }
                });
            }
        });
        assert_eq!(hits.load(Ordering::SeqCst), 128 * 4 * 10);
    }

    #[test]
    fn subscribe_racing_initialize_is_never_lost() {
        for _ in 0..32 {
            let registry = EventRegistry::new();
            let accepted = AtomicUsize::new(0);

            std::thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            registry.subscribe("race", |_| Ok(()));
                        }));
                        if outcome.is_ok() {
                            accepted.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
                s.spawn(|| registry.initialize());
            });

            assert!(registry.is_initialized());
            assert_eq!(registry.handler_count("race"), accepted.load(Ordering::SeqCst));
        }
    }
}
