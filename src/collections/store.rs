// ============================================================================
// ripple-signals - Collection Store
// The locked state and batching shared by every observable collection
// ============================================================================
//
// One re-entrant lock per collection guards the state, the batch depth and
// every emit. Re-entrancy is what lets a batch body (and observers reacting
// to its events on the same thread) call back into the collection.
//
// State is held as an `Arc` and copied on write, so an event's snapshot is
// never disturbed by the mutations that follow it.
//
// Batches nest. Only the outermost one emits `BeginBatch`/`EndBatch`, so
// observers always see matched, non-overlapping pairs.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::trace;

use crate::collections::event::{ChangeKind, CollectionEvent};
use crate::core::types::{AnyDisposable, Event, Observer};
use crate::primitives::subject::Subject;

struct StoreState<S> {
    data: RefCell<Arc<S>>,
    depth: Cell<u32>,
}

pub(crate) struct CollectionStore<S> {
    state: ReentrantMutex<StoreState<S>>,
    changes: Subject<CollectionEvent<S>>,
}

impl<S: Clone + Send + Sync + 'static> CollectionStore<S> {
    pub(crate) fn new(data: S) -> Self {
        Self {
            state: ReentrantMutex::new(StoreState {
                data: RefCell::new(Arc::new(data)),
                depth: Cell::new(0),
            }),
            changes: Subject::new(),
        }
    }

    /// Current state, shared.
    pub(crate) fn snapshot(&self) -> Arc<S> {
        self.state.lock().data.borrow().clone()
    }

    /// Read the state under the lock.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock();
        let data = state.data.borrow();
        f(&data)
    }

    /// Apply a mutation and emit the change it reports, if any.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut S) -> (R, Option<ChangeKind>)) -> R {
        let state = self.state.lock();
        let (result, change) = {
            let mut data = state.data.borrow_mut();
            let (result, kind) = f(Arc::make_mut(&mut data));
            (result, kind.map(|kind| CollectionEvent::new(kind, data.clone())))
        };
        if let Some(event) = change {
            trace!(kind = ?event.kind, "collection change");
            self.changes.next(event);
        }
        drop(state);
        result
    }

    /// Mutate without notifying anyone.
    ///
    /// `f` works on its own copy of the state, so it may read the collection
    /// through other handles (seeing the state from before `f` started).
    /// Changes made through other handles while `f` runs are overwritten.
    pub(crate) fn silent<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let state = self.state.lock();
        let mut working = state.data.borrow().clone();
        let result = f(Arc::make_mut(&mut working));
        *state.data.borrow_mut() = working;
        result
    }

    /// Run `body` inside a batch.
    ///
    /// The lock is held for the whole body, so no other thread can interleave
    /// events into the bracket.
    pub(crate) fn batch<R>(&self, body: impl FnOnce() -> R) -> R {
        let state = self.state.lock();
        let depth = state.depth.get();
        state.depth.set(depth + 1);
        if depth == 0 {
            self.emit_marker(&state, ChangeKind::BeginBatch);
        }

        // Closes the bracket even if `body` panics.
        struct BatchGuard<'a, S: Clone + Send + Sync + 'static> {
            store: &'a CollectionStore<S>,
            state: ReentrantMutexGuard<'a, StoreState<S>>,
        }

        impl<S: Clone + Send + Sync + 'static> Drop for BatchGuard<'_, S> {
            fn drop(&mut self) {
                let depth = self.state.depth.get() - 1;
                self.state.depth.set(depth);
                if depth == 0 {
                    self.store.emit_marker(&self.state, ChangeKind::EndBatch);
                }
            }
        }

        let _guard = BatchGuard { store: self, state };
        body()
    }

    fn emit_marker(&self, state: &StoreState<S>, kind: ChangeKind) {
        let source = state.data.borrow().clone();
        trace!(?kind, "collection batch marker");
        self.changes.next(CollectionEvent::new(kind, source));
    }

    /// Register an observer, delivering `Initial` to it first.
    pub(crate) fn subscribe(&self, observer: Observer<CollectionEvent<S>>) -> AnyDisposable {
        let state = self.state.lock();
        let source = state.data.borrow().clone();
        let handle = self.changes.subscribe(observer.clone());
        observer(&Event::Next(CollectionEvent::new(ChangeKind::Initial, source)));
        drop(state);
        handle
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.changes.observer_count()
    }
}
