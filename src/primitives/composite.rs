// ============================================================================
// ripple-signals - Composite and Serial Disposables
// Aggregates that own and cascade-release other handles
// ============================================================================

use std::ops::AddAssign;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::types::{AnyDisposable, Disposable};

// =============================================================================
// COMPOSITE DISPOSABLE
// =============================================================================

struct CompositeState {
    disposed: bool,
    members: Vec<AnyDisposable>,
}

/// Owns an ordered set of handles and disposes them all together.
///
/// Adding to a composite that is already disposed disposes the added handle
/// on the spot instead of storing it.
///
/// # Example
///
/// ```
/// use ripple_signals::{CompositeDisposable, Disposable, SimpleDisposable};
/// use std::sync::Arc;
///
/// let composite = CompositeDisposable::new();
/// let a = Arc::new(SimpleDisposable::new());
/// composite.add(a.clone());
///
/// composite.dispose();
/// assert!(a.is_disposed());
///
/// let late = Arc::new(SimpleDisposable::new());
/// composite.add(late.clone());
/// assert!(late.is_disposed());
/// ```
pub struct CompositeDisposable {
    state: Mutex<CompositeState>,
}

impl CompositeDisposable {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a composite owning `members`.
    pub fn from_vec(members: Vec<AnyDisposable>) -> Self {
        Self {
            state: Mutex::new(CompositeState {
                disposed: false,
                members,
            }),
        }
    }

    /// Add a handle, or dispose it immediately if the composite is disposed.
    ///
    /// Members that were disposed elsewhere are pruned here.
    pub fn add(&self, disposable: AnyDisposable) {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            disposable.dispose();
            return;
        }
        state.members.retain(|member| !member.is_disposed());
        state.members.push(disposable);
    }

    /// Number of members currently held.
    pub fn len(&self) -> usize {
        self.state.lock().members.len()
    }

    /// Whether no members are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CompositeDisposable {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposable for CompositeDisposable {
    fn dispose(&self) {
        let members = {
            let mut state = self.state.lock();
            state.disposed = true;
            std::mem::take(&mut state.members)
        };
        for member in members {
            member.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl AddAssign<AnyDisposable> for CompositeDisposable {
    fn add_assign(&mut self, rhs: AnyDisposable) {
        self.add(rhs);
    }
}

impl std::fmt::Debug for CompositeDisposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CompositeDisposable")
            .field("disposed", &state.disposed)
            .field("members", &state.members.len())
            .finish()
    }
}

// =============================================================================
// SERIAL DISPOSABLE
// =============================================================================

struct SerialState {
    disposed: bool,
    current: Option<AnyDisposable>,
}

/// Owns at most one handle at a time.
///
/// Assigning a new handle disposes the previous one. Once the serial itself
/// is disposed, any handle assigned to it is disposed on assignment.
pub struct SerialDisposable {
    state: Mutex<SerialState>,
}

impl SerialDisposable {
    /// Create a serial holding `initial`.
    pub fn new(initial: Option<AnyDisposable>) -> Self {
        Self {
            state: Mutex::new(SerialState {
                disposed: false,
                current: initial,
            }),
        }
    }

    /// Replace the current handle.
    pub fn set(&self, disposable: AnyDisposable) {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            disposable.dispose();
            return;
        }
        let previous = state.current.replace(disposable);
        drop(state);
        if let Some(previous) = previous {
            previous.dispose();
        }
    }

    /// The handle currently held, if any.
    pub fn current(&self) -> Option<AnyDisposable> {
        self.state.lock().current.clone()
    }
}

impl Default for SerialDisposable {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Disposable for SerialDisposable {
    fn dispose(&self) {
        let current = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.current.take()
        };
        if let Some(current) = current {
            current.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

/// Collect handles into one composite handle.
pub fn composite(members: impl IntoIterator<Item = AnyDisposable>) -> AnyDisposable {
    Arc::new(CompositeDisposable::from_vec(members.into_iter().collect()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::disposable::{BlockDisposable, SimpleDisposable};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn simple() -> Arc<SimpleDisposable> {
        Arc::new(SimpleDisposable::new())
    }

    #[test]
    fn composite_disposes_all_members() {
        let composite = CompositeDisposable::new();
        let a = simple();
        let b = simple();
        composite.add(a.clone());
        composite.add(b.clone());

        composite.dispose();

        assert!(a.is_disposed());
        assert!(b.is_disposed());
        assert!(composite.is_disposed());
        assert!(composite.is_empty());
    }

    #[test]
    fn composite_add_after_dispose_disposes_immediately() {
        let composite = CompositeDisposable::new();
        composite.dispose();

        let late = simple();
        composite.add(late.clone());

        assert!(late.is_disposed());
        assert!(composite.is_empty());
    }

    #[test]
    fn composite_prunes_disposed_members_on_add() {
        let composite = CompositeDisposable::new();
        let a = simple();
        composite.add(a.clone());
        a.dispose();

        composite.add(simple());
        assert_eq!(composite.len(), 1);
    }

    #[test]
    fn composite_add_assign() {
        let mut composite = CompositeDisposable::new();
        let a = simple();
        composite += a.clone() as AnyDisposable;

        composite.dispose();
        assert!(a.is_disposed());
    }

    #[test]
    fn composite_double_dispose_runs_members_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();
        let composite = CompositeDisposable::new();
        composite.add(BlockDisposable::boxed(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        }));

        composite.dispose();
        composite.dispose();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn serial_replacing_disposes_previous() {
        let serial = SerialDisposable::default();
        let first = simple();
        let second = simple();

        serial.set(first.clone());
        serial.set(second.clone());

        assert!(first.is_disposed());
        assert!(!second.is_disposed());

        serial.dispose();
        assert!(second.is_disposed());
    }

    #[test]
    fn serial_disposed_disposes_on_assignment() {
        let serial = SerialDisposable::new(None);
        serial.dispose();

        let late = simple();
        serial.set(late.clone());

        assert!(late.is_disposed());
        assert!(serial.current().is_none());
    }

    #[test]
    fn composite_helper_wraps_members() {
        let a = simple();
        let b = simple();
        let handle = composite([a.clone() as AnyDisposable, b.clone() as AnyDisposable]);

        handle.dispose();
        assert!(a.is_disposed() && b.is_disposed());
    }
}
