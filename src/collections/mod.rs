// ============================================================================
// ripple-signals - Observable Collections
// Lists and keyed mappings that emit structural diffs
// ============================================================================
//
// Each collection reports its mutations as `CollectionEvent`s:
//
// 1. Initial: the full state, delivered once to each new observer
// 2. Inserts / Deletes / Updates: the exact indices one mutation touched
// 3. BeginBatch / EndBatch: brackets around a bulk operation
// ============================================================================

mod array;
mod dictionary;
mod event;
mod store;

pub use array::{ArrayEvent, ObservableArray};
pub use dictionary::{DictionaryEvent, ObservableDictionary, OrderedEntries};
pub use event::{ChangeKind, CollectionEvent};
