//! Diagnostic observers for resolution traceability.
//!
//! Observers are notified whenever the container resolves a key through a
//! definition: when it starts, when it succeeds (with the elapsed time) and
//! when it fails.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::DiError;

/// Observer trait for container resolution events.
///
/// Observer calls are made synchronously during resolution. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use ferrous_autowire::{Container, DiError, DiObserver, TypeDescriptor, TypeRegistry};
///
/// #[derive(Default)]
/// struct Recorder {
///     events: RefCell<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &str) {
///         self.events.borrow_mut().push(format!("resolving {}", key));
///     }
///
///     fn resolved(&self, key: &str, _duration: Duration) {
///         self.events.borrow_mut().push(format!("resolved {}", key));
///     }
///
///     fn failed(&self, key: &str, _error: &DiError) {
///         self.events.borrow_mut().push(format!("failed {}", key));
///     }
/// }
///
/// let container = Container::new(TypeRegistry::new().with_type(TypeDescriptor::class("Mailer")));
/// container.define("Mailer", ()).unwrap();
///
/// let recorder = Rc::new(Recorder::default());
/// container.add_observer(recorder.clone());
/// container.get("Mailer").unwrap();
///
/// assert_eq!(*recorder.events.borrow(), vec!["resolving Mailer", "resolved Mailer"]);
/// ```
pub trait DiObserver {
    /// Called before a definition is resolved.
    fn resolving(&self, key: &str);

    /// Called after a definition resolved successfully.
    ///
    /// # Arguments
    ///
    /// * `key` - The key that was resolved
    /// * `duration` - Time elapsed from `resolving` to `resolved`
    fn resolved(&self, key: &str, duration: Duration);

    /// Called when resolving a definition failed. The error still propagates.
    fn failed(&self, key: &str, error: &DiError);
}

/// Container for registered observers.
///
/// Minimal overhead when no observers are registered.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Rc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Rc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &str) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, key: &str, error: &DiError) {
        for observer in &self.observers {
            observer.failed(key, error);
        }
    }
}

/// Built-in observer that emits `tracing` events.
///
/// Resolutions are logged at `debug`, failures at `warn` with the full
/// error chain. Install a subscriber (for example `tracing-subscriber`) to
/// see them.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use ferrous_autowire::{Container, LoggingObserver, TypeRegistry};
///
/// let container = Container::new(TypeRegistry::new());
/// container.add_observer(Rc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "ferrous-autowire".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &str) {
        tracing::debug!(prefix = %self.prefix, key, "resolving");
    }

    fn resolved(&self, key: &str, duration: Duration) {
        tracing::debug!(prefix = %self.prefix, key, ?duration, "resolved");
    }

    fn failed(&self, key: &str, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, key, error = %error.full_message(), "resolution failed");
    }
}

/// Observer counting resolutions, failures and total time.
///
/// ```
/// use std::rc::Rc;
/// use ferrous_autowire::{Container, MetricsObserver, TypeDescriptor, TypeRegistry};
///
/// let container = Container::new(TypeRegistry::new().with_type(TypeDescriptor::class("Mailer")));
/// container.define("Mailer", ()).unwrap();
/// let metrics = Rc::new(MetricsObserver::new());
/// container.add_observer(metrics.clone());
///
/// container.get("Mailer").unwrap();
/// container.get("Mailer").unwrap();
/// assert!(container.get("Missing").is_err());
///
/// assert_eq!(metrics.resolution_count(), 2);
/// assert_eq!(metrics.failure_count(), 0);
/// ```
#[derive(Default)]
pub struct MetricsObserver {
    resolutions: Cell<u64>,
    failures: Cell<u64>,
    total: Cell<Duration>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolutions.get()
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.get()
    }

    pub fn total_resolution_time(&self) -> Duration {
        self.total.get()
    }

    /// Average time per successful resolution, `None` before the first one.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolutions.get();
        if count == 0 {
            return None;
        }
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        Some(self.total.get() / count)
    }

    pub fn reset(&self) {
        self.resolutions.set(0);
        self.failures.set(0);
        self.total.set(Duration::ZERO);
    }
}

impl DiObserver for MetricsObserver {
    fn resolving(&self, _key: &str) {}

    fn resolved(&self, _key: &str, duration: Duration) {
        self.resolutions.set(self.resolutions.get() + 1);
        self.total.set(self.total.get() + duration);
    }

    fn failed(&self, _key: &str, _error: &DiError) {
        self.failures.set(self.failures.get() + 1);
    }
}
