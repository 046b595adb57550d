// ============================================================================
// ripple-signals - Observable
// A single mutable value with change notification
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::types::{AnyDisposable, Event};
use crate::primitives::bind::{Bindable, bidirectional_bind};
use crate::primitives::signal::{AsSignal, Signal};
use crate::primitives::subject::Subject;

// =============================================================================
// OBSERVABLE INNER
// =============================================================================

struct ObservableInner<T> {
    value: Mutex<T>,
    changes: Subject<T>,
}

// =============================================================================
// OBSERVABLE<T>
// =============================================================================

/// A value that notifies observers whenever it is written.
///
/// Every `set` emits, even when the new value equals the old one; use
/// [`bidirectional_bind`] or a `filter` where deduplication matters.
///
/// # Example
///
/// ```
/// use ripple_signals::Observable;
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let count = Observable::new(0);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let seen_clone = seen.clone();
/// let _h = count.observe(move |v| seen_clone.lock().push(*v));
///
/// count.set(1);
/// count.update(|v| *v += 1);
///
/// assert_eq!(count.get(), 2);
/// assert_eq!(*seen.lock(), vec![0, 1, 2]);
/// ```
pub struct Observable<T> {
    inner: Arc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    /// Create an observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                value: Mutex::new(value),
                changes: Subject::new(),
            }),
        }
    }

    /// The current value.
    pub fn get(&self) -> T {
        self.inner.value.lock().clone()
    }

    /// Read the current value without cloning it.
    ///
    /// The value lock is held while `f` runs, so `f` must not write back.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.lock())
    }

    /// Store `value` and emit it to every observer.
    pub fn set(&self, value: T) {
        *self.inner.value.lock() = value.clone();
        self.inner.changes.next(value);
    }

    /// Mutate the value in place, then emit the result.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let value = {
            let mut guard = self.inner.value.lock();
            f(&mut guard);
            guard.clone()
        };
        self.inner.changes.next(value);
    }

    /// Observe the current value immediately, then every later write.
    pub fn observe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> AnyDisposable {
        self.to_signal().observe_next(observer)
    }

    /// Observe later writes only.
    pub fn observe_new(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> AnyDisposable {
        self.inner.changes.observe_next(observer)
    }

    /// Number of observers currently attached.
    pub fn observer_count(&self) -> usize {
        self.inner.changes.observer_count()
    }

    /// Keep this observable and `other` in sync in both directions.
    ///
    /// This observable's current value is written into `other` first.
    pub fn bidirectional_bind<P>(&self, other: &P) -> AnyDisposable
    where
        T: PartialEq + Sync,
        P: AsSignal<T> + Bindable<T> + Clone + 'static,
    {
        bidirectional_bind(self, other)
    }
}

impl<T: Clone + Send + 'static> AsSignal<T> for Observable<T> {
    /// The current value followed by every later write.
    fn to_signal(&self) -> Signal<T> {
        let inner = self.inner.clone();
        Signal::new(move |observer| {
            // Holding the value lock while registering means no write can
            // slip in between reading the current value and subscribing.
            let (current, handle) = {
                let value = inner.value.lock();
                let handle = inner.changes.subscribe(observer.clone());
                (value.clone(), handle)
            };
            observer(&Event::Next(current));
            handle
        })
    }
}

impl<T: Clone + Send + 'static> Bindable<T> for Observable<T> {
    fn write(&self, value: T) {
        self.set(value);
    }
}

impl<T: Clone + Send + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.lock())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Disposable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn observe_fires_with_current_value_first() {
        let name = Observable::new(String::from("a"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _h = name.observe(move |v| seen_clone.lock().push(v.clone()));
        name.set("b".to_string());

        assert_eq!(*seen.lock(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn observe_new_skips_current_value() {
        let count = Observable::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let _h = count.observe_new(move |v| seen_clone.lock().push(*v));
        count.set(3);

        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn set_emits_even_when_equal() {
        let flag = Observable::new(false);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _h = flag.observe_new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        flag.set(false);
        flag.set(false);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disposed_observer_stops_receiving() {
        let count = Observable::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let handle = count.observe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        handle.dispose();
        count.set(1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(count.observer_count(), 0);
    }

    #[test]
    fn map_bind_to_derives_flag() {
        let text = Observable::new(String::new());
        let valid = Observable::new(false);
        let _h = text.map(|t| t.chars().count() > 3).bind_to(&valid);

        text.set("abc".to_string());
        assert!(!valid.get());
        text.set("abcd".to_string());
        assert!(valid.get());
    }

    #[test]
    fn bidirectional_bind_between_observables() {
        let model = Observable::new(String::from("start"));
        let field = Observable::new(String::new());
        let model_writes = Arc::new(AtomicUsize::new(0));
        let field_writes = Arc::new(AtomicUsize::new(0));

        let mw = model_writes.clone();
        let _m = model.observe_new(move |_| {
            mw.fetch_add(1, Ordering::SeqCst);
        });
        let fw = field_writes.clone();
        let _f = field.observe_new(move |_| {
            fw.fetch_add(1, Ordering::SeqCst);
        });

        let _bind = model.bidirectional_bind(&field);
        assert_eq!(field.get(), "start");
        assert_eq!(field_writes.load(Ordering::SeqCst), 1);
        assert_eq!(model_writes.load(Ordering::SeqCst), 0);

        model.set("x".to_string());
        assert_eq!(field.get(), "x");
        assert_eq!(field_writes.load(Ordering::SeqCst), 2);
        assert_eq!(model_writes.load(Ordering::SeqCst), 1);

        field.set("y".to_string());
        assert_eq!(model.get(), "y");
        assert_eq!(model_writes.load(Ordering::SeqCst), 2);
        assert_eq!(field_writes.load(Ordering::SeqCst), 3);
    }
}
