// ============================================================================
// ripple-signals - Render Targets
// Applying collection diffs to a view incrementally
// ============================================================================
//
// A binding subscribes to a collection and forwards each event to the
// matching target call:
//
//   Initial      -> reload
//   Inserts      -> insert_rows
//   Deletes      -> delete_rows
//   Updates      -> reload_rows
//   BeginBatch   -> begin_updates
//   EndBatch     -> end_updates
//
// Only `Initial` reloads everything. Every other event touches exactly the
// rows it names.
// ============================================================================

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::collections::{
    ChangeKind, CollectionEvent, ObservableArray, ObservableDictionary, OrderedEntries,
};
use crate::core::types::AnyDisposable;
use crate::primitives::signal::{AsSignal, Signal};

// =============================================================================
// ROW SOURCE
// =============================================================================

/// Collection state a target can read rows out of.
pub trait RowSource {
    type Row: Clone;

    fn row_count(&self) -> usize;

    fn row(&self, index: usize) -> Option<Self::Row>;
}

impl<T: Clone> RowSource for Vec<T> {
    type Row = T;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<T> {
        self.get(index).cloned()
    }
}

impl<K: Hash + Eq + Clone, V: Clone> RowSource for OrderedEntries<K, V> {
    type Row = (K, V);

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<(K, V)> {
        self.entry_at(index).map(|(k, v)| (k.clone(), v.clone()))
    }
}

// =============================================================================
// RENDER TARGET
// =============================================================================

/// A view that can apply structural changes.
///
/// `source` is the collection state after the change, so inserted and
/// reloaded rows are read from it at the given indices.
pub trait RenderTarget<S: ?Sized> {
    /// Throw away every row and render `source` from scratch.
    fn reload(&mut self, source: &S);

    /// Rows now exist at `indices` (ascending, post-change positions).
    fn insert_rows(&mut self, indices: &[usize], source: &S);

    /// Rows at `indices` (pre-change positions) are gone.
    fn delete_rows(&mut self, indices: &[usize]);

    /// Rows at `indices` changed content.
    fn reload_rows(&mut self, indices: &[usize], source: &S);

    /// Start of a transaction; visual updates may be deferred.
    fn begin_updates(&mut self) {}

    /// End of a transaction; deferred updates should be flushed.
    fn end_updates(&mut self) {}
}

/// Forward one collection event to `target`.
pub fn apply_event<S, R>(target: &mut R, event: &CollectionEvent<S>)
where
    R: RenderTarget<S> + ?Sized,
{
    trace!(kind = ?event.kind, "render target apply");
    match &event.kind {
        ChangeKind::Initial => target.reload(&event.source),
        ChangeKind::Inserts(indices) => target.insert_rows(indices, &event.source),
        ChangeKind::Deletes(indices) => target.delete_rows(indices),
        ChangeKind::Updates(indices) => target.reload_rows(indices, &event.source),
        ChangeKind::BeginBatch => target.begin_updates(),
        ChangeKind::EndBatch => target.end_updates(),
    }
}

// =============================================================================
// BINDING
// =============================================================================

impl<S: Send + Sync + 'static> Signal<CollectionEvent<S>> {
    /// Drive `target` from this collection signal.
    ///
    /// Events are applied on the thread that produced them; producers must
    /// already be on the target's owning context.
    pub fn bind_to_target<R>(&self, target: &Arc<Mutex<R>>) -> AnyDisposable
    where
        R: RenderTarget<S> + Send + 'static,
    {
        let target = target.clone();
        self.observe_next(move |event| apply_event(&mut *target.lock(), event))
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableArray<T> {
    /// Drive `target` from this list, starting with a full reload.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_signals::{MirrorTarget, ObservableArray};
    /// use std::sync::Arc;
    /// use parking_lot::Mutex;
    ///
    /// let rows = ObservableArray::new(vec![1, 2]);
    /// let table = Arc::new(Mutex::new(MirrorTarget::<i32>::new()));
    /// let _h = rows.bind_to_target(&table);
    ///
    /// rows.append(3);
    /// rows.set(0, 10);
    ///
    /// let table = table.lock();
    /// assert_eq!(table.rows(), &[10, 2, 3]);
    /// assert_eq!(table.reload_count(), 1);
    /// ```
    pub fn bind_to_target<R>(&self, target: &Arc<Mutex<R>>) -> AnyDisposable
    where
        R: RenderTarget<Vec<T>> + Send + 'static,
    {
        self.to_signal().bind_to_target(target)
    }
}

impl<K, V> ObservableDictionary<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Drive `target` from this dictionary, one row per entry in insertion
    /// order.
    pub fn bind_to_target<R>(&self, target: &Arc<Mutex<R>>) -> AnyDisposable
    where
        R: RenderTarget<OrderedEntries<K, V>> + Send + 'static,
    {
        self.to_signal().bind_to_target(target)
    }
}
