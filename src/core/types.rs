// ============================================================================
// ripple-signals - Type Definitions
// Events, observers and the type-erased disposable interface
// ============================================================================

use std::sync::Arc;

// =============================================================================
// EVENTS
// =============================================================================

/// A single delivery from a signal.
///
/// There is no failure variant: a source either keeps producing `Next` values
/// or finishes with exactly one `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    /// A new value
    Next(T),
    /// Terminal event, nothing follows it
    Completed,
}

impl<T> Event<T> {
    /// The carried value, if this is a `Next` event.
    pub fn value(&self) -> Option<&T> {
        match self {
            Event::Next(value) => Some(value),
            Event::Completed => None,
        }
    }

    /// Whether this is the terminal event.
    pub fn is_completed(&self) -> bool {
        matches!(self, Event::Completed)
    }

    /// Transform the carried value, keeping completion as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Event<U> {
        match self {
            Event::Next(value) => Event::Next(f(value)),
            Event::Completed => Event::Completed,
        }
    }
}

// =============================================================================
// OBSERVERS AND JOBS
// =============================================================================

/// Type-erased observer callback.
///
/// Observers receive events by reference so a multicast delivery never clones
/// the value once per observer.
pub type Observer<T> = Arc<dyn Fn(&Event<T>) + Send + Sync>;

/// A unit of work handed to an execution context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

// =============================================================================
// TYPE-ERASED DISPOSABLE
// =============================================================================
//
// Every subscription in the crate hands back one of these. Aggregates
// (composite, serial, bag) store them as `AnyDisposable` so handles of
// different concrete types can share one container.
// =============================================================================

/// A cancellation handle with idempotent release.
///
/// `dispose()` may be called any number of times from any thread; only the
/// first call has an effect. `is_disposed()` never reverts to false.
pub trait Disposable: Send + Sync {
    /// Release whatever this handle represents.
    fn dispose(&self);

    /// Whether the handle has been released.
    fn is_disposed(&self) -> bool;
}

/// Shared, type-erased disposable handle.
pub type AnyDisposable = Arc<dyn Disposable>;

impl<D: Disposable + ?Sized> Disposable for Arc<D> {
    fn dispose(&self) {
        (**self).dispose();
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

impl<D: Disposable + ?Sized> Disposable for Box<D> {
    fn dispose(&self) {
        (**self).dispose();
    }

    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

// =============================================================================
// TESTS
// =============================================================================
