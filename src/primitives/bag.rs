// ============================================================================
// ripple-signals - Dispose Bag
//
// Group subscriptions for disposal together with their owner.
// ============================================================================
//
// A DisposeBag collects the handles a component creates. When the component
// is torn down, every handle goes with it.
//
// Key features:
// - add(handle) / handle.dispose_in(&bag) - collect a subscription
// - on_dispose(fn) - register a plain cleanup closure
// - dispose() - release every member, the bag stays usable
// - close() - the owner is gone: release members, fire `deallocated`
// - Drop closes the bag if the owner never did it explicitly
// ============================================================================

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::core::constants::*;
use crate::core::types::{AnyDisposable, Disposable};
use crate::primitives::disposable::BlockDisposable;
use crate::primitives::signal::{AsSignal, Signal};
use crate::primitives::subject::Subject;

// =============================================================================
// DISPOSE BAG
// =============================================================================

/// A container that disposes its handles when its owner goes away.
///
/// # Example
///
/// ```
/// use ripple_signals::{DisposeBag, DisposeIn, Observable};
///
/// let count = Observable::new(0);
/// let bag = DisposeBag::new();
///
/// count.observe(|v| println!("count: {v}")).dispose_in(&bag);
/// assert_eq!(count.observer_count(), 1);
///
/// bag.close();
/// assert_eq!(count.observer_count(), 0);
/// ```
pub struct DisposeBag {
    members: Mutex<Vec<AnyDisposable>>,
    flags: AtomicU8,
    deallocated: Subject<()>,
}

impl DisposeBag {
    /// Create an empty, open bag.
    pub fn new() -> Self {
        Self {
            members: Mutex::new(Vec::new()),
            flags: AtomicU8::new(ACTIVE),
            deallocated: Subject::replay_latest(),
        }
    }

    /// Add a handle to the bag.
    ///
    /// A closed bag disposes the handle immediately instead.
    pub fn add(&self, disposable: AnyDisposable) {
        if self.is_closed() {
            disposable.dispose();
            return;
        }
        self.members.lock().push(disposable);
    }

    /// Register a cleanup closure that runs when the bag is disposed.
    pub fn on_dispose(&self, cleanup: impl FnOnce() + Send + 'static) {
        self.add(BlockDisposable::boxed(cleanup));
    }

    /// Number of handles currently held.
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    /// Whether the bag holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the owner has been torn down.
    pub fn is_closed(&self) -> bool {
        self.flags.load(Ordering::Acquire) & CLOSED != 0
    }

    /// Tear the bag down for good.
    ///
    /// Disposes every member, then fires `deallocated` exactly once.
    /// Calling it again is a no-op.
    pub fn close(&self) {
        if self.flags.fetch_or(CLOSED, Ordering::AcqRel) & CLOSED != 0 {
            return;
        }
        self.dispose_members();
        debug!("dispose bag closed");
        self.deallocated.next(());
        self.deallocated.completed();
    }

    /// One-shot notification that the owner is gone.
    ///
    /// Observers attached after `close()` still receive it.
    pub fn deallocated(&self) -> Signal<()> {
        self.deallocated.to_signal()
    }

    fn dispose_members(&self) {
        let members = std::mem::take(&mut *self.members.lock());
        if members.is_empty() {
            return;
        }
        debug!(count = members.len(), "disposing bag members");
        for member in members {
            member.dispose();
        }
    }
}

impl Default for DisposeBag {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposable for DisposeBag {
    /// Dispose every member and clear the bag; the bag itself stays open.
    fn dispose(&self) {
        self.dispose_members();
    }

    /// True whenever the bag is empty.
    fn is_disposed(&self) -> bool {
        self.is_empty()
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DisposeBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeBag")
            .field("members", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

// =============================================================================
// OWNER TRAITS
// =============================================================================

/// A component that owns a dispose bag.
pub trait DisposeBagProvider {
    /// The bag tied to this component's lifetime.
    fn dispose_bag(&self) -> &DisposeBag;
}

/// Move a handle into a bag.
pub trait DisposeIn {
    /// Hand this subscription over to `bag`.
    fn dispose_in(self, bag: &DisposeBag);
}

impl DisposeIn for AnyDisposable {
    fn dispose_in(self, bag: &DisposeBag) {
        bag.add(self);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::disposable::SimpleDisposable;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dispose_cascades_and_clears() {
        let bag = DisposeBag::new();
        let a = Arc::new(SimpleDisposable::new());
        let b = Arc::new(SimpleDisposable::new());
        bag.add(a.clone());
        bag.add(b.clone());

        bag.dispose();

        assert!(a.is_disposed());
        assert!(b.is_disposed());
        assert!(bag.is_empty());
        assert!(bag.is_disposed());
    }

    #[test]
    fn dispose_twice_is_safe() {
        let bag = DisposeBag::new();
        bag.add(Arc::new(SimpleDisposable::new()));

        bag.dispose();
        bag.dispose();

        assert!(bag.is_empty());
    }

    #[test]
    fn add_after_dispose_still_works() {
        let bag = DisposeBag::new();
        bag.dispose();

        let fresh = Arc::new(SimpleDisposable::new());
        bag.add(fresh.clone());

        assert!(!fresh.is_disposed());
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn add_after_close_disposes_immediately() {
        let bag = DisposeBag::new();
        bag.close();

        let late = Arc::new(SimpleDisposable::new());
        bag.add(late.clone());

        assert!(late.is_disposed());
        assert!(bag.is_empty());
    }

    #[test]
    fn on_dispose_runs_cleanup_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();
        let bag = DisposeBag::new();
        bag.on_dispose(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        });

        bag.dispose();
        bag.close();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deallocated_fires_once_on_close() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let bag = DisposeBag::new();
        let _h = bag.deallocated().observe_next(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        bag.close();
        bag.close();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deallocated_replays_to_late_observer() {
        let bag = DisposeBag::new();
        bag.close();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let _h = bag.deallocated().observe_next(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes_the_bag() {
        let member = Arc::new(SimpleDisposable::new());
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let bag = DisposeBag::new();
            bag.add(member.clone());
            let fired_clone = fired.clone();
            bag.deallocated()
                .observe_next(move |_| {
                    fired_clone.fetch_add(1, Ordering::SeqCst);
                })
                .dispose_in(&bag);
        }
        assert!(member.is_disposed());
        // The observer lived in the bag, so it was disposed before the
        // notification went out.
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_notifies_external_observer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let signal = {
            let bag = DisposeBag::new();
            bag.deallocated()
        };
        let fired_clone = fired.clone();
        let _h = signal.observe_next(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
