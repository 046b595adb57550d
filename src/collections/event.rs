// ============================================================================
// ripple-signals - Collection Events
// Structural diffs emitted by observable collections
// ============================================================================

use std::sync::Arc;

// =============================================================================
// CHANGE KIND
// =============================================================================

/// What a collection mutation touched.
///
/// Indices always address the `source` carried by the same event, i.e. the
/// collection state right after the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// Full state at subscription time
    Initial,
    /// Rows that now exist at these positions
    Inserts(Vec<usize>),
    /// Rows that were removed from these positions (pre-removal positions)
    Deletes(Vec<usize>),
    /// Rows whose content changed in place
    Updates(Vec<usize>),
    /// Start of a run of events to be applied as one transaction
    BeginBatch,
    /// End of the run opened by `BeginBatch`
    EndBatch,
}

impl ChangeKind {
    /// The indices carried by an insert, delete or update.
    pub fn indices(&self) -> &[usize] {
        match self {
            ChangeKind::Inserts(indices)
            | ChangeKind::Deletes(indices)
            | ChangeKind::Updates(indices) => indices,
            _ => &[],
        }
    }

    /// Whether this is a batch bracket.
    pub fn is_batch_marker(&self) -> bool {
        matches!(self, ChangeKind::BeginBatch | ChangeKind::EndBatch)
    }
}

// =============================================================================
// COLLECTION EVENT
// =============================================================================

/// A diff together with the state it produced.
///
/// The state is shared, not copied: every event of one mutation and every
/// observer of it hold the same `Arc`.
pub struct CollectionEvent<S> {
    pub kind: ChangeKind,
    pub source: Arc<S>,
}

impl<S> CollectionEvent<S> {
    pub fn new(kind: ChangeKind, source: Arc<S>) -> Self {
        Self { kind, source }
    }
}

impl<S> Clone for CollectionEvent<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            source: self.source.clone(),
        }
    }
}

impl<S: PartialEq> PartialEq for CollectionEvent<S> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.source == other.source
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CollectionEvent<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionEvent")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}
