// ============================================================================
// ripple-signals - Subject
// Hot, multicast, never-failing event source
// ============================================================================
//
// A Subject keeps a registry of observers behind one lock. Emitting takes a
// snapshot of the registry under the lock, releases it, then delivers on the
// calling thread. This is what makes re-entrant emits and subscribes from
// inside an observer safe:
//
// - observers added during delivery miss the event being delivered
// - observers disposed during delivery are skipped from that point on
// - completion is terminal, later emits are dropped
//
// The replay-latest flavour additionally remembers the last value and hands
// it to late subscribers. Its emits and replays are serialized by a
// re-entrant ordering lock, so a late subscriber never sees the replayed
// value after a newer one emitted from another thread.
// ============================================================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, trace};

use crate::core::constants::*;
use crate::core::types::{AnyDisposable, Event, Observer};
use crate::primitives::disposable::{BlockDisposable, SimpleDisposable};
use crate::primitives::signal::{AsSignal, Signal};

// =============================================================================
// REGISTRATION
// =============================================================================

/// One observer slot in a subject's registry.
struct Registration<T> {
    id: u64,
    observer: Observer<T>,
    active: AtomicBool,
}

impl<T> Registration<T> {
    fn deliver(&self, event: &Event<T>) {
        // Checked per delivery so a slot disposed mid-emit is skipped.
        if self.active.load(Ordering::Acquire) {
            (self.observer)(event);
        }
    }
}

// =============================================================================
// SUBJECT INNER
// =============================================================================

struct SubjectState<T> {
    flags: u8,
    latest: Option<T>,
    registrations: Vec<Arc<Registration<T>>>,
}

struct SubjectInner<T> {
    state: Mutex<SubjectState<T>>,
    next_id: AtomicU64,
    replay: bool,
    ordering: ReentrantMutex<()>,
}

impl<T: Clone + Send + 'static> SubjectInner<T> {
    fn new(replay: bool) -> Self {
        Self {
            state: Mutex::new(SubjectState {
                flags: ACTIVE,
                latest: None,
                registrations: Vec::new(),
            }),
            next_id: AtomicU64::new(0),
            replay,
            ordering: ReentrantMutex::new(()),
        }
    }

    /// Held across an emit or a replay; only the replay flavour needs it.
    fn order(&self) -> Option<ReentrantMutexGuard<'_, ()>> {
        self.replay.then(|| self.ordering.lock())
    }

    fn on(&self, event: Event<T>) {
        let _order = self.order();
        let snapshot = {
            let mut state = self.state.lock();
            if state.flags & COMPLETED != 0 {
                trace!("event dropped, subject already completed");
                return;
            }
            match &event {
                Event::Next(value) if self.replay => state.latest = Some(value.clone()),
                Event::Next(_) => {}
                Event::Completed => state.flags |= COMPLETED,
            }
            if event.is_completed() {
                std::mem::take(&mut state.registrations)
            } else {
                state.registrations.clone()
            }
        };

        trace!(observers = snapshot.len(), completed = event.is_completed(), "subject emit");
        for registration in &snapshot {
            registration.deliver(&event);
        }

        if event.is_completed() {
            for registration in &snapshot {
                registration.active.store(false, Ordering::Release);
            }
        }
    }

    fn remove(&self, id: u64) {
        self.state.lock().registrations.retain(|r| r.id != id);
    }
}

// =============================================================================
// SUBJECT (public handle)
// =============================================================================

/// A hot multicast event source.
///
/// Cloning a subject yields another handle to the same registry.
///
/// # Example
///
/// ```
/// use ripple_signals::{Disposable, Subject};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// let subject = Subject::new();
/// let seen = Arc::new(AtomicI32::new(0));
///
/// let seen_clone = seen.clone();
/// let handle = subject.observe_next(move |v: &i32| {
///     seen_clone.store(*v, Ordering::SeqCst);
/// });
///
/// subject.next(7);
/// assert_eq!(seen.load(Ordering::SeqCst), 7);
///
/// handle.dispose();
/// subject.next(9);
/// assert_eq!(seen.load(Ordering::SeqCst), 7);
/// ```
pub struct Subject<T> {
    inner: Arc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    /// Create a publish subject: observers only see events emitted after
    /// they subscribed.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubjectInner::new(false)),
        }
    }

    /// Create a replay-latest subject: late observers immediately receive
    /// the most recent value.
    pub fn replay_latest() -> Self {
        Self {
            inner: Arc::new(SubjectInner::new(true)),
        }
    }

    /// Emit a value to every current observer.
    pub fn next(&self, value: T) {
        self.inner.on(Event::Next(value));
    }

    /// Emit the terminal event and drop every registration.
    pub fn completed(&self) {
        self.inner.on(Event::Completed);
    }

    /// Emit an arbitrary event.
    pub fn on(&self, event: Event<T>) {
        self.inner.on(event);
    }

    /// Whether completion has been emitted.
    pub fn is_completed(&self) -> bool {
        self.inner.state.lock().flags & COMPLETED != 0
    }

    /// Number of live registrations.
    pub fn observer_count(&self) -> usize {
        self.inner.state.lock().registrations.len()
    }

    /// Register an observer.
    ///
    /// Disposing the returned handle deregisters this observer and only this
    /// observer. Subscribing to a completed subject replays the latest value
    /// (replay flavour only) and the completion, then returns a disposed
    /// handle.
    pub fn subscribe(&self, observer: Observer<T>) -> AnyDisposable {
        let _order = self.inner.order();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let registration = Arc::new(Registration {
            id,
            observer: observer.clone(),
            active: AtomicBool::new(true),
        });

        let (latest, completed) = {
            let mut state = self.inner.state.lock();
            let completed = state.flags & COMPLETED != 0;
            if !completed {
                state.registrations.push(registration.clone());
            }
            (state.latest.clone(), completed)
        };

        if let Some(latest) = latest {
            observer(&Event::Next(latest));
        }
        if completed {
            observer(&Event::Completed);
            return Arc::new(SimpleDisposable::disposed());
        }

        debug!(id, "subject observer registered");
        let weak: Weak<SubjectInner<T>> = Arc::downgrade(&self.inner);
        BlockDisposable::boxed(move || {
            registration.active.store(false, Ordering::Release);
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
            }
            debug!(id, "subject observer disposed");
        })
    }

    /// Register a closure for every event.
    pub fn observe(&self, observer: impl Fn(&Event<T>) + Send + Sync + 'static) -> AnyDisposable {
        self.subscribe(Arc::new(observer))
    }

    /// Register a closure for values only.
    pub fn observe_next(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> AnyDisposable {
        self.observe(move |event| {
            if let Event::Next(value) = event {
                observer(value);
            }
        })
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> AsSignal<T> for Subject<T> {
    fn to_signal(&self) -> Signal<T> {
        let subject = self.clone();
        Signal::new(move |observer| subject.subscribe(observer))
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Subject")
            .field("observers", &state.registrations.len())
            .field("completed", &(state.flags & COMPLETED != 0))
            .field("replay", &self.inner.replay)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
