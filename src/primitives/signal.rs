// ============================================================================
// ripple-signals - Signal
// The composable stream view every source can be turned into
// ============================================================================
//
// A Signal is a producer: observing it runs the producer with the observer
// and returns whatever handle the producer hands back. Subjects, observables
// and collections expose themselves as signals through `AsSignal`, and every
// operator (map, filter, throttle, bind) is a new Signal wrapping an upstream
// one.
// ============================================================================

use std::sync::Arc;

use crate::core::types::{AnyDisposable, Event, Observer};
use crate::primitives::bind::Bindable;
use crate::primitives::disposable::NonDisposable;
use crate::reactivity::scheduling::ExecutionContext;

type Producer<T> = dyn Fn(Observer<T>) -> AnyDisposable + Send + Sync;

// =============================================================================
// SIGNAL<T>
// =============================================================================

/// A stream of events that can be observed any number of times.
///
/// # Example
///
/// ```
/// use ripple_signals::{AsSignal, Subject};
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let subject: Subject<String> = Subject::new();
/// let lengths = Arc::new(Mutex::new(Vec::new()));
///
/// let lengths_clone = lengths.clone();
/// let _handle = subject
///     .map(|text: &String| text.len())
///     .observe_next(move |len| lengths_clone.lock().push(*len));
///
/// subject.next("abc".to_string());
/// assert_eq!(*lengths.lock(), vec![3]);
/// ```
pub struct Signal<T> {
    producer: Arc<Producer<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
        }
    }
}

impl<T: Send + 'static> Signal<T> {
    /// Create a signal from a producer.
    ///
    /// The producer runs once per observer and must return the handle that
    /// stops delivery to that observer.
    pub fn new(producer: impl Fn(Observer<T>) -> AnyDisposable + Send + Sync + 'static) -> Self {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// A signal that never emits.
    pub fn never() -> Self {
        Self::new(|_| NonDisposable::instance())
    }

    /// A signal that emits `values` synchronously, then completes.
    pub fn sequence(values: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move |observer| {
            for value in &values {
                observer(&Event::Next(value.clone()));
            }
            observer(&Event::Completed);
            NonDisposable::instance()
        })
    }

    /// Attach a type-erased observer.
    pub fn subscribe(&self, observer: Observer<T>) -> AnyDisposable {
        (self.producer)(observer)
    }

    /// Observe every event.
    pub fn observe(&self, observer: impl Fn(&Event<T>) + Send + Sync + 'static) -> AnyDisposable {
        self.subscribe(Arc::new(observer))
    }

    /// Observe values only.
    pub fn observe_next(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> AnyDisposable {
        self.observe(move |event| {
            if let Event::Next(value) = event {
                observer(value);
            }
        })
    }

    /// Observe completion only.
    pub fn observe_completed(&self, observer: impl Fn() + Send + Sync + 'static) -> AnyDisposable {
        self.observe(move |event| {
            if event.is_completed() {
                observer();
            }
        })
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").finish_non_exhaustive()
    }
}

// =============================================================================
// AS SIGNAL
// =============================================================================

/// Anything that can be viewed as a `Signal`.
///
/// The operator methods are provided so they can be called straight on a
/// subject, an observable or a collection.
pub trait AsSignal<T: Send + 'static> {
    /// The signal view of this source.
    fn to_signal(&self) -> Signal<T>;

    /// See [`Signal::map`].
    fn map<U, F>(&self, transform: F) -> Signal<U>
    where
        U: Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.to_signal().map(transform)
    }

    /// See [`Signal::filter`].
    fn filter<F>(&self, predicate: F) -> Signal<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.to_signal().filter(predicate)
    }

    /// See [`Signal::throttle`].
    fn throttle(&self, interval: std::time::Duration, context: Arc<dyn ExecutionContext>) -> Signal<T>
    where
        T: Clone + Sync,
    {
        self.to_signal().throttle(interval, context)
    }

    /// See [`Signal::bind_to`].
    fn bind_to<B>(&self, sink: &B) -> AnyDisposable
    where
        T: Clone,
        B: Bindable<T> + Clone + 'static,
    {
        self.to_signal().bind_to(sink)
    }
}

impl<T: Send + 'static> AsSignal<T> for Signal<T> {
    fn to_signal(&self) -> Signal<T> {
        self.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
