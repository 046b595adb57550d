// ============================================================================
// ripple-signals - MirrorTarget
// A headless render target that keeps its own copy of the rows
// ============================================================================

use crate::render::target::{RenderTarget, RowSource};

/// One call a target received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    Reload,
    Insert(Vec<usize>),
    Delete(Vec<usize>),
    Update(Vec<usize>),
    BeginUpdates,
    EndUpdates,
}

/// A render target that mirrors the bound collection row by row.
///
/// Every call is recorded, so the mirror doubles as a record of how a view
/// was driven: how many full reloads happened, how many transactions were
/// opened, which rows each diff touched.
#[derive(Debug, Clone)]
pub struct MirrorTarget<R> {
    rows: Vec<R>,
    ops: Vec<RenderOp>,
    open_transactions: usize,
}

impl<R> MirrorTarget<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            ops: Vec::new(),
            open_transactions: 0,
        }
    }

    /// Rows as currently displayed.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Every call received, in order.
    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn reload_count(&self) -> usize {
        self.count(|op| matches!(op, RenderOp::Reload))
    }

    /// Completed `begin_updates`/`end_updates` pairs.
    pub fn transaction_count(&self) -> usize {
        self.count(|op| matches!(op, RenderOp::EndUpdates))
    }

    /// Whether a transaction is open right now.
    pub fn in_transaction(&self) -> bool {
        self.open_transactions > 0
    }

    /// Forget the recorded calls, keeping the rows.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    fn count(&self, predicate: impl Fn(&RenderOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }
}

impl<R> Default for MirrorTarget<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RenderTarget<S> for MirrorTarget<S::Row>
where
    S: RowSource,
{
    fn reload(&mut self, source: &S) {
        self.rows = (0..source.row_count()).filter_map(|i| source.row(i)).collect();
        self.ops.push(RenderOp::Reload);
    }

    fn insert_rows(&mut self, indices: &[usize], source: &S) {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        for index in sorted {
            if let Some(row) = source.row(index) {
                let at = index.min(self.rows.len());
                self.rows.insert(at, row);
            }
        }
        self.ops.push(RenderOp::Insert(indices.to_vec()));
    }

    fn delete_rows(&mut self, indices: &[usize]) {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        for index in sorted {
            if index < self.rows.len() {
                self.rows.remove(index);
            }
        }
        self.ops.push(RenderOp::Delete(indices.to_vec()));
    }

    fn reload_rows(&mut self, indices: &[usize], source: &S) {
        for &index in indices {
            if let (Some(slot), Some(row)) = (self.rows.get_mut(index), source.row(index)) {
                *slot = row;
            }
        }
        self.ops.push(RenderOp::Update(indices.to_vec()));
    }

    fn begin_updates(&mut self) {
        self.open_transactions += 1;
        self.ops.push(RenderOp::BeginUpdates);
    }

    fn end_updates(&mut self) {
        self.open_transactions = self.open_transactions.saturating_sub(1);
        self.ops.push(RenderOp::EndUpdates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::{ObservableArray, ObservableDictionary};
    use crate::core::types::Disposable;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn mirror_tracks_array_through_every_kind_of_change() {
        let array = ObservableArray::new(vec!["a", "b", "c"]);
        let target = Arc::new(Mutex::new(MirrorTarget::<&str>::new()));
        let _h = array.bind_to_target(&target);

        array.insert("x", 1);
        array.remove_at(3);
        array.set(0, "z");
        array.replace(vec!["p", "q"]);
        array.append("r");

        let target = target.lock();
        assert_eq!(target.rows(), array.to_vec().as_slice());
        assert_eq!(target.reload_count(), 1, "only the initial render reloads");
        assert_eq!(target.transaction_count(), 1);
        assert!(!target.in_transaction());
    }

    #[test]
    fn replace_is_applied_as_one_transaction() {
        let array = ObservableArray::new(vec![1, 2, 3]);
        let target = Arc::new(Mutex::new(MirrorTarget::<i32>::new()));
        let _h = array.bind_to_target(&target);
        target.lock().clear_ops();

        array.replace(vec![4, 5]);

        let target = target.lock();
        assert_eq!(
            target.ops(),
            &[
                RenderOp::BeginUpdates,
                RenderOp::Delete(vec![0, 1, 2]),
                RenderOp::Insert(vec![0, 1]),
                RenderOp::EndUpdates,
            ]
        );
        assert_eq!(target.rows(), &[4, 5]);
    }

    #[test]
    fn mirror_tracks_dictionary_entries() {
        let dictionary = ObservableDictionary::new();
        dictionary.update_value("a", 1);
        let target = Arc::new(Mutex::new(MirrorTarget::<(&str, i32)>::new()));
        let _h = dictionary.bind_to_target(&target);

        dictionary.update_value("b", 2);
        dictionary.update_value("a", 10);
        dictionary.remove_value(&"b");

        assert_eq!(target.lock().rows(), &[("a", 10)]);
    }

    #[test]
    fn disposed_binding_stops_applying() {
        let array = ObservableArray::new(vec![1]);
        let target = Arc::new(Mutex::new(MirrorTarget::<i32>::new()));
        let handle = array.bind_to_target(&target);
        handle.dispose();

        array.append(2);

        assert_eq!(target.lock().rows(), &[1]);
    }
}
