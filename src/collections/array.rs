// ============================================================================
// ripple-signals - ObservableArray
// A list that reports every mutation as an indexed diff
// ============================================================================

use std::sync::Arc;

use crate::collections::event::{ChangeKind, CollectionEvent};
use crate::collections::store::CollectionStore;
use crate::core::types::AnyDisposable;
use crate::primitives::signal::{AsSignal, Signal};

/// Event type emitted by [`ObservableArray`].
pub type ArrayEvent<T> = CollectionEvent<Vec<T>>;

// =============================================================================
// OBSERVABLE ARRAY
// =============================================================================

/// A list whose observers receive structural diffs instead of full copies.
///
/// Every single-element mutation emits exactly one event naming the index it
/// touched. Bulk operations emit one event covering all their indices,
/// bracketed by `BeginBatch`/`EndBatch`.
///
/// Cloning yields another handle to the same list.
///
/// # Example
///
/// ```
/// use ripple_signals::{ChangeKind, ObservableArray};
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let rows = ObservableArray::new(vec!["a"]);
/// let kinds = Arc::new(Mutex::new(Vec::new()));
///
/// let kinds_clone = kinds.clone();
/// let _h = rows.observe(move |event| kinds_clone.lock().push(event.kind.clone()));
///
/// rows.append("b");
/// rows.remove_at(0);
///
/// assert_eq!(
///     *kinds.lock(),
///     vec![
///         ChangeKind::Initial,
///         ChangeKind::Inserts(vec![1]),
///         ChangeKind::Deletes(vec![0]),
///     ]
/// );
/// assert_eq!(rows.to_vec(), vec!["b"]);
/// ```
pub struct ObservableArray<T> {
    store: Arc<CollectionStore<Vec<T>>>,
}

impl<T> Clone for ObservableArray<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableArray<T> {
    /// Create a list holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            store: Arc::new(CollectionStore::new(items)),
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub fn len(&self) -> usize {
        self.store.read(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<T> {
        self.store.read(|items| items.get(index).cloned())
    }

    /// A copy of the current contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.store.read(|items| items.clone())
    }

    /// The current contents, shared with any event that carries them.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.store.snapshot()
    }

    // =========================================================================
    // SINGLE-ELEMENT MUTATIONS
    // =========================================================================

    /// Add `item` at the end. Emits `Inserts([len])`.
    pub fn append(&self, item: T) {
        self.store.mutate(|items| {
            items.push(item);
            ((), Some(ChangeKind::Inserts(vec![items.len() - 1])))
        });
    }

    /// Insert `item` at `index`. Emits `Inserts([index])`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, like [`Vec::insert`].
    pub fn insert(&self, item: T, index: usize) {
        self.store.mutate(|items| {
            items.insert(index, item);
            ((), Some(ChangeKind::Inserts(vec![index])))
        });
    }

    /// Remove the element at `index`. Emits `Deletes([index])`.
    ///
    /// Out of range is a no-op returning `None`.
    pub fn remove_at(&self, index: usize) -> Option<T> {
        self.store.mutate(|items| {
            if index < items.len() {
                (Some(items.remove(index)), Some(ChangeKind::Deletes(vec![index])))
            } else {
                (None, None)
            }
        })
    }

    /// Remove the last element, if any.
    pub fn remove_last(&self) -> Option<T> {
        self.store.mutate(|items| match items.pop() {
            Some(item) => (Some(item), Some(ChangeKind::Deletes(vec![items.len()]))),
            None => (None, None),
        })
    }

    /// Replace the element at `index`, returning the old one. Emits
    /// `Updates([index])`. Out of range is a no-op returning `None`.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        self.store.mutate(|items| match items.get_mut(index) {
            Some(slot) => (
                Some(std::mem::replace(slot, item)),
                Some(ChangeKind::Updates(vec![index])),
            ),
            None => (None, None),
        })
    }

    // =========================================================================
    // BULK MUTATIONS
    // =========================================================================

    /// Insert every element of `new_items` starting at `index`, as one batch
    /// holding a single `Inserts` event.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_contents_of(&self, new_items: Vec<T>, index: usize) {
        self.store.batch(|| {
            self.store.mutate(|items| {
                let count = new_items.len();
                items.splice(index..index, new_items);
                let change =
                    (count > 0).then(|| ChangeKind::Inserts((index..index + count).collect()));
                ((), change)
            })
        });
    }

    /// Remove every element, as one batch holding a single `Deletes` event.
    pub fn remove_all(&self) {
        self.store.batch(|| {
            self.store.mutate(|items| {
                let count = items.len();
                items.clear();
                let change = (count > 0).then(|| ChangeKind::Deletes((0..count).collect()));
                ((), change)
            })
        });
    }

    /// Replace the whole contents in one batch: a delete of every old row
    /// followed by an insert of every new one.
    pub fn replace(&self, new_items: Vec<T>) {
        self.batch_update(|array| {
            array.remove_all();
            array.insert_contents_of(new_items, 0);
        });
    }

    /// Run `body` as one batch. Mutations made through `body`'s handle on
    /// the same thread are bracketed by a single `BeginBatch`/`EndBatch`.
    pub fn batch_update<R>(&self, body: impl FnOnce(&Self) -> R) -> R {
        self.store.batch(|| body(self))
    }

    /// Mutate the contents directly without notifying observers.
    ///
    /// Reads through other handles inside `body` see the contents from
    /// before `body` started.
    pub fn silent_update<R>(&self, body: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.store.silent(body)
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// Observe the list: `Initial` immediately, then every diff.
    pub fn observe(
        &self,
        observer: impl Fn(&ArrayEvent<T>) + Send + Sync + 'static,
    ) -> AnyDisposable {
        self.to_signal().observe_next(observer)
    }

    /// Number of observers currently attached.
    pub fn observer_count(&self) -> usize {
        self.store.observer_count()
    }
}

impl<T: Clone + Send + Sync + 'static> AsSignal<ArrayEvent<T>> for ObservableArray<T> {
    fn to_signal(&self) -> Signal<ArrayEvent<T>> {
        let store = self.store.clone();
        Signal::new(move |observer| store.subscribe(observer))
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableArray<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for ObservableArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for ObservableArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.snapshot().iter()).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Disposable;
    use parking_lot::Mutex;

    fn kinds<T: Clone + Send + Sync + 'static>(
        array: &ObservableArray<T>,
    ) -> (Arc<Mutex<Vec<ChangeKind>>>, AnyDisposable) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let handle = array.observe(move |event| log_clone.lock().push(event.kind.clone()));
        (log, handle)
    }

    #[test]
    fn observe_starts_with_initial_state() {
        let array = ObservableArray::new(vec![1, 2]);
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        let _h = array.observe(move |event| {
            if event.kind == ChangeKind::Initial {
                *seen_clone.lock() = Some(event.source.as_ref().clone());
            }
        });
        assert_eq!(*seen.lock(), Some(vec![1, 2]));
    }

    #[test]
    fn single_mutations_emit_one_event_each() {
        let array = ObservableArray::new(vec!['a', 'b', 'c']);
        let (log, _h) = kinds(&array);

        array.append('d');
        array.insert('x', 1);
        array.set(0, 'z');
        array.remove_at(2);
        array.remove_last();

        assert_eq!(
            *log.lock(),
            vec![
                ChangeKind::Initial,
                ChangeKind::Inserts(vec![3]),
                ChangeKind::Inserts(vec![1]),
                ChangeKind::Updates(vec![0]),
                ChangeKind::Deletes(vec![2]),
                ChangeKind::Deletes(vec![3]),
            ]
        );
        assert_eq!(array.to_vec(), vec!['z', 'x', 'c']);
    }

    #[test]
    fn out_of_range_is_silent_noop() {
        let array = ObservableArray::new(vec![1]);
        let (log, _h) = kinds(&array);

        assert_eq!(array.remove_at(5), None);
        assert_eq!(array.set(5, 9), None);
        array.remove_last();
        assert_eq!(array.remove_last(), None);

        assert_eq!(log.lock().len(), 2, "initial plus the one real delete");
    }

    #[test]
    fn event_snapshot_is_state_after_mutation() {
        let array = ObservableArray::new(vec![1]);
        let sources = Arc::new(Mutex::new(Vec::new()));
        let sources_clone = sources.clone();
        let _h = array.observe(move |event| sources_clone.lock().push(event.source.clone()));

        array.append(2);
        array.append(3);

        let sources = sources.lock();
        assert_eq!(*sources[0], vec![1]);
        assert_eq!(*sources[1], vec![1, 2]);
        assert_eq!(*sources[2], vec![1, 2, 3]);
    }

    #[test]
    fn replace_is_one_batch() {
        let array = ObservableArray::new(vec![1, 2]);
        let (log, _h) = kinds(&array);

        array.replace(vec![7, 8, 9]);

        assert_eq!(
            *log.lock(),
            vec![
                ChangeKind::Initial,
                ChangeKind::BeginBatch,
                ChangeKind::Deletes(vec![0, 1]),
                ChangeKind::Inserts(vec![0, 1, 2]),
                ChangeKind::EndBatch,
            ]
        );
        assert_eq!(array.to_vec(), vec![7, 8, 9]);
    }

    #[test]
    fn empty_bulk_operations_still_bracket() {
        let array: ObservableArray<i32> = ObservableArray::default();
        let (log, _h) = kinds(&array);

        array.remove_all();
        array.insert_contents_of(Vec::new(), 0);

        assert_eq!(
            *log.lock(),
            vec![
                ChangeKind::Initial,
                ChangeKind::BeginBatch,
                ChangeKind::EndBatch,
                ChangeKind::BeginBatch,
                ChangeKind::EndBatch,
            ]
        );
    }

    #[test]
    fn nested_batches_emit_one_pair() {
        let array = ObservableArray::new(vec![1]);
        let (log, _h) = kinds(&array);

        array.batch_update(|a| {
            a.append(2);
            a.batch_update(|inner| inner.append(3));
        });

        assert_eq!(
            *log.lock(),
            vec![
                ChangeKind::Initial,
                ChangeKind::BeginBatch,
                ChangeKind::Inserts(vec![1]),
                ChangeKind::Inserts(vec![2]),
                ChangeKind::EndBatch,
            ]
        );
    }

    #[test]
    fn silent_update_emits_nothing() {
        let array = ObservableArray::new(vec![1]);
        let (log, _h) = kinds(&array);

        array.silent_update(|items| items.push(2));

        assert_eq!(*log.lock(), vec![ChangeKind::Initial]);
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn silent_update_may_read_through_another_handle() {
        let array = ObservableArray::new(vec![1, 2]);
        let reader = array.clone();

        let seen = array.silent_update(|items| {
            items.push(reader.len() as i32);
            (reader.len(), reader.to_vec())
        });

        assert_eq!(seen, (2, vec![1, 2]));
        assert_eq!(array.to_vec(), vec![1, 2, 2]);
    }

    #[test]
    fn observer_may_read_during_delivery() {
        let array = ObservableArray::new(Vec::<i32>::new());
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let reader = array.clone();
        let lengths_clone = lengths.clone();
        let _h = array.observe(move |_| lengths_clone.lock().push(reader.len()));

        array.append(1);

        assert_eq!(*lengths.lock(), vec![0, 1]);
    }

    #[test]
    fn dispose_detaches_observer() {
        let array = ObservableArray::new(vec![1]);
        let (log, handle) = kinds(&array);
        handle.dispose();

        array.append(2);

        assert_eq!(log.lock().len(), 1);
        assert_eq!(array.observer_count(), 0);
    }

    #[test]
    fn batch_closes_even_if_body_panics() {
        let array = ObservableArray::new(vec![1]);
        let (log, _h) = kinds(&array);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            array.batch_update(|a| {
                a.append(2);
                panic!("body failed");
            })
        }));

        assert!(result.is_err());
        assert_eq!(log.lock().last(), Some(&ChangeKind::EndBatch));
    }
}
