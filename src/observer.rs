//! Diagnostic observers for container lookups.
//!
//! Observers see every `get` the container serves: when it starts, when a new
//! object is constructed for it, and how it ended. They are meant for
//! tracing, timing and debugging; they cannot influence resolution.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Identifier;

/// Observer of container lookups.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ferrous_wire::{Config, Container, DiObserver, Identifier, TypeDescriptor, TypeRegistry};
///
/// #[derive(Default)]
/// struct Clock;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl DiObserver for Counter {
///     fn resolving(&self, _id: &Identifier) {}
///     fn resolved(&self, _id: &Identifier, _duration: Duration) {}
///     fn constructed(&self, _id: &Identifier, _type_name: &str) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let mut types = TypeRegistry::new();
/// types.register(TypeDescriptor::of::<Clock>().alias("Clock").default_constructible());
///
/// let counter = Arc::new(Counter::default());
/// let container = Container::builder(Config::from_json(serde_json::json!({"di.service": {"clock": "Clock"}})))
///     .types(types)
///     .observer(counter.clone())
///     .build()
///     .unwrap();
///
/// container.get("clock").unwrap();
/// container.get("clock@").unwrap();
/// assert_eq!(counter.0.load(Ordering::Relaxed), 2);
/// ```
pub trait DiObserver: Send + Sync {
    /// A lookup started.
    fn resolving(&self, id: &Identifier);

    /// A lookup finished successfully.
    fn resolved(&self, id: &Identifier, duration: Duration);

    /// A new object was built for the lookup (cache misses only).
    fn constructed(&self, _id: &Identifier, _type_name: &str) {}

    /// A lookup failed.
    fn failed(&self, _id: &Identifier, _error: &DiError) {}
}

/// Registered observers of one container.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, id: &Identifier) {
        for observer in &self.observers {
            observer.resolving(id);
        }
    }

    pub(crate) fn resolved(&self, id: &Identifier, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(id, duration);
        }
    }

    pub(crate) fn constructed(&self, id: &Identifier, type_name: &str) {
        for observer in &self.observers {
            observer.constructed(id, type_name);
        }
    }

    pub(crate) fn failed(&self, id: &Identifier, error: &DiError) {
        for observer in &self.observers {
            observer.failed(id, error);
        }
    }
}

/// Forwards lookup events to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TracingObserver {
    target: Option<String>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags every event with a label, e.g. the application name.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self { target: Some(label.into()) }
    }

    fn label(&self) -> &str {
        self.target.as_deref().unwrap_or("container")
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, id: &Identifier) {
        tracing::trace!(label = self.label(), id = %id, "resolving");
    }

    fn resolved(&self, id: &Identifier, duration: Duration) {
        tracing::debug!(label = self.label(), id = %id, elapsed_us = duration.as_micros() as u64, "resolved");
    }

    fn constructed(&self, id: &Identifier, type_name: &str) {
        tracing::debug!(label = self.label(), id = %id, type_name, "constructed");
    }

    fn failed(&self, id: &Identifier, error: &DiError) {
        tracing::warn!(label = self.label(), id = %id, error = %error, "resolution failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl DiObserver for Recorder {
        fn resolving(&self, id: &Identifier) {
            self.0.lock().push(format!("resolving {id}"));
        }
        fn resolved(&self, id: &Identifier, _duration: Duration) {
            self.0.lock().push(format!("resolved {id}"));
        }
        fn failed(&self, id: &Identifier, error: &DiError) {
            self.0.lock().push(format!("failed {id}: {error}"));
        }
    }

    #[test]
    fn events_fan_out_in_registration_order() {
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let mut observers = Observers::new();
        assert!(!observers.has_observers());
        observers.add(a.clone());
        observers.add(b.clone());

        let id = Identifier::parse("cache@S");
        observers.resolving(&id);
        observers.constructed(&id, "Cache");
        observers.failed(&id, &DiError::NotFound("cache".into()));

        let expected = vec!["resolving cache@S".to_string(), "failed cache@S: Service cache not found".to_string()];
        assert_eq!(*a.0.lock(), expected);
        assert_eq!(*b.0.lock(), expected);
    }

    #[test]
    fn tracing_observer_is_silent_without_subscriber() {
        let observer = TracingObserver::with_label("test");
        let id = Identifier::parse("x");
        observer.resolving(&id);
        observer.resolved(&id, Duration::from_micros(5));
        observer.failed(&id, &DiError::NotFound("x".into()));
    }
}
