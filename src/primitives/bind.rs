// ============================================================================
// ripple-signals - Bindings
// One-way and two-way links between signals and writable sinks
// ============================================================================
//
// A binding forwards values from a signal into a sink. A bidirectional
// binding is two such links plus shared state that stops a write from
// echoing back to where it came from:
//
// - a reentrancy flag, set for the duration of one propagation
// - the last value synced through the binding, so equal values are dropped
//
// One external edit therefore causes at most one write on the other side.
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::core::types::AnyDisposable;
use crate::primitives::composite::composite;
use crate::primitives::signal::{AsSignal, Signal};
use crate::primitives::subject::Subject;

// =============================================================================
// BINDABLE
// =============================================================================

/// A writable sink a signal can be bound to.
pub trait Bindable<T>: Send + Sync {
    /// Push a value into the sink.
    fn write(&self, value: T);
}

impl<T: Clone + Send + 'static> Bindable<T> for Subject<T> {
    fn write(&self, value: T) {
        self.next(value);
    }
}

/// A sink backed by a closure.
///
/// # Example
///
/// ```
/// use ripple_signals::{AsSignal, FnSink, Subject};
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let hidden = Arc::new(Mutex::new(false));
/// let hidden_clone = hidden.clone();
/// let sink = FnSink::new(move |v: bool| *hidden_clone.lock() = v);
///
/// let progress: Subject<bool> = Subject::new();
/// let _h = progress.map(|busy| !busy).bind_to(&sink);
///
/// progress.next(false);
/// assert!(*hidden.lock());
/// ```
pub struct FnSink<F> {
    write: Arc<F>,
}

impl<F> Clone for FnSink<F> {
    fn clone(&self) -> Self {
        Self {
            write: self.write.clone(),
        }
    }
}

impl<F> FnSink<F> {
    /// Wrap `write`.
    pub fn new(write: F) -> Self {
        Self {
            write: Arc::new(write),
        }
    }
}

impl<T, F> Bindable<T> for FnSink<F>
where
    F: Fn(T) + Send + Sync,
{
    fn write(&self, value: T) {
        (self.write)(value);
    }
}

// =============================================================================
// ONE-WAY BINDING
// =============================================================================

impl<T: Clone + Send + 'static> Signal<T> {
    /// Write every value of this signal into `sink`.
    ///
    /// Completion is not forwarded; the sink simply stops receiving values.
    pub fn bind_to<B>(&self, sink: &B) -> AnyDisposable
    where
        B: Bindable<T> + Clone + 'static,
    {
        let sink = sink.clone();
        self.observe_next(move |value| sink.write(value.clone()))
    }
}

// =============================================================================
// TWO-WAY BINDING
// =============================================================================

struct BindingState<T> {
    propagating: AtomicBool,
    last_synced: Mutex<Option<T>>,
}

/// Clears the reentrancy flag when a propagation ends, even on panic.
struct PropagationGuard<'a>(&'a AtomicBool);

impl Drop for PropagationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: Clone + PartialEq> BindingState<T> {
    fn propagate(&self, value: &T, sink: &dyn Bindable<T>, direction: &'static str) {
        if self.propagating.swap(true, Ordering::AcqRel) {
            trace!(direction, "echo suppressed");
            return;
        }
        let _guard = PropagationGuard(&self.propagating);

        let changed = {
            let mut last = self.last_synced.lock();
            if last.as_ref() == Some(value) {
                false
            } else {
                *last = Some(value.clone());
                true
            }
        };
        if changed {
            trace!(direction, "propagating value");
            sink.write(value.clone());
        }
    }
}

/// Keep `left` and `right` in sync in both directions.
///
/// `left` is the source of truth at bind time: its current value (if its
/// signal replays one) is written into `right` first. Disposing the returned
/// handle tears down both directions.
///
/// # Example
///
/// ```
/// use ripple_signals::{bidirectional_bind, Observable};
///
/// let model = Observable::new(String::from("a"));
/// let field = Observable::new(String::new());
/// let _h = bidirectional_bind(&model, &field);
///
/// assert_eq!(field.get(), "a");
/// field.set("b".to_string());
/// assert_eq!(model.get(), "b");
/// ```
pub fn bidirectional_bind<T, L, R>(left: &L, right: &R) -> AnyDisposable
where
    T: Clone + PartialEq + Send + Sync + 'static,
    L: AsSignal<T> + Bindable<T> + Clone + 'static,
    R: AsSignal<T> + Bindable<T> + Clone + 'static,
{
    let state = Arc::new(BindingState {
        propagating: AtomicBool::new(false),
        last_synced: Mutex::new(None),
    });

    let forward = {
        let state = state.clone();
        let sink = right.clone();
        left.to_signal()
            .observe_next(move |value| state.propagate(value, &sink, "left->right"))
    };
    let backward = {
        let sink = left.clone();
        right
            .to_signal()
            .observe_next(move |value| state.propagate(value, &sink, "right->left"))
    };

    composite([forward, backward])
}

// =============================================================================
// TESTS
// =============================================================================
