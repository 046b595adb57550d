// ============================================================================
// ripple-signals - ObservableDictionary
// A keyed mapping that reports every mutation as an indexed diff
// ============================================================================
//
// Entries keep insertion order, and a key's index is its position in that
// order. Indices in an event address the entries of the snapshot carried by
// the same event.
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::collections::event::{ChangeKind, CollectionEvent};
use crate::collections::store::CollectionStore;
use crate::core::types::AnyDisposable;
use crate::primitives::signal::{AsSignal, Signal};

/// Event type emitted by [`ObservableDictionary`].
pub type DictionaryEvent<K, V> = CollectionEvent<OrderedEntries<K, V>>;

// =============================================================================
// ORDERED ENTRIES
// =============================================================================

/// Insertion-ordered key/value storage with constant-time lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedEntries<K: Hash + Eq, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone, V> OrderedEntries<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Position of `key` in insertion order.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// The entry at position `index`.
    pub fn entry_at(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Insert or replace, returning the replaced value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value).1
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<V> {
        self.remove(key).map(|(_, value)| value)
    }

    /// Insert or replace. Returns the position and the replaced value.
    fn upsert(&mut self, key: K, value: V) -> (usize, Option<V>) {
        match self.index.get(&key) {
            Some(&i) => (i, Some(std::mem::replace(&mut self.entries[i].1, value))),
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, value));
                (i, None)
            }
        }
    }

    /// Remove `key`. Returns its former position and value.
    fn remove(&mut self, key: &K) -> Option<(usize, V)> {
        let i = self.index.remove(key)?;
        let (_, value) = self.entries.remove(i);
        for (k, _) in &self.entries[i..] {
            if let Some(slot) = self.index.get_mut(k) {
                *slot -= 1;
            }
        }
        Some((i, value))
    }

    fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.index.clear();
        count
    }
}

impl<K: Hash + Eq + Clone, V> Default for OrderedEntries<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone, V> FromIterator<(K, V)> for OrderedEntries<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = Self::new();
        for (key, value) in iter {
            entries.upsert(key, value);
        }
        entries
    }
}

// =============================================================================
// OBSERVABLE DICTIONARY
// =============================================================================

/// A keyed mapping whose observers receive structural diffs.
///
/// # Example
///
/// ```
/// use ripple_signals::{ChangeKind, ObservableDictionary};
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let scores = ObservableDictionary::new();
/// let kinds = Arc::new(Mutex::new(Vec::new()));
///
/// let kinds_clone = kinds.clone();
/// let _h = scores.observe(move |event| kinds_clone.lock().push(event.kind.clone()));
///
/// assert_eq!(scores.update_value("ada", 1), None);
/// assert_eq!(scores.update_value("ada", 2), Some(1));
/// assert_eq!(scores.remove_value(&"bob"), None);
///
/// assert_eq!(
///     *kinds.lock(),
///     vec![
///         ChangeKind::Initial,
///         ChangeKind::Inserts(vec![0]),
///         ChangeKind::Updates(vec![0]),
///     ]
/// );
/// ```
pub struct ObservableDictionary<K: Hash + Eq, V> {
    store: Arc<CollectionStore<OrderedEntries<K, V>>>,
}

impl<K: Hash + Eq, V> Clone for ObservableDictionary<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<K, V> ObservableDictionary<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::from_entries(OrderedEntries::new())
    }

    /// Create a dictionary holding `entries`, in their given order.
    pub fn from_entries(entries: OrderedEntries<K, V>) -> Self {
        Self {
            store: Arc::new(CollectionStore::new(entries)),
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub fn len(&self) -> usize {
        self.store.read(OrderedEntries::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.store.read(|entries| entries.get(key).cloned())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.store.read(|entries| entries.index_of(key).is_some())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<K> {
        self.store.read(|entries| entries.keys().cloned().collect())
    }

    /// The current entries, shared with any event that carries them.
    pub fn snapshot(&self) -> Arc<OrderedEntries<K, V>> {
        self.store.snapshot()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Insert or replace the value for `key`.
    ///
    /// A new key emits `Inserts([i])` and returns `None`; an existing key
    /// emits `Updates([i])` and returns the old value.
    pub fn update_value(&self, key: K, value: V) -> Option<V> {
        self.store.mutate(|entries| {
            let (i, old) = entries.upsert(key, value);
            let kind = if old.is_some() {
                ChangeKind::Updates(vec![i])
            } else {
                ChangeKind::Inserts(vec![i])
            };
            (old, Some(kind))
        })
    }

    /// Remove `key`, emitting `Deletes([i])`. An absent key is a silent
    /// no-op returning `None`.
    pub fn remove_value(&self, key: &K) -> Option<V> {
        self.store.mutate(|entries| match entries.remove(key) {
            Some((i, value)) => (Some(value), Some(ChangeKind::Deletes(vec![i]))),
            None => (None, None),
        })
    }

    /// Subscript-style write: `Some` updates, `None` removes.
    pub fn set(&self, key: K, value: Option<V>) {
        match value {
            Some(value) => {
                self.update_value(key, value);
            }
            None => {
                self.remove_value(&key);
            }
        }
    }

    /// Remove every entry, as one batch holding a single `Deletes` event.
    pub fn remove_all(&self) {
        self.store.batch(|| {
            self.store.mutate(|entries| {
                let count = entries.clear();
                ((), (count > 0).then(|| ChangeKind::Deletes((0..count).collect())))
            })
        });
    }

    /// Run `body` as one batch.
    pub fn batch_update<R>(&self, body: impl FnOnce(&Self) -> R) -> R {
        self.store.batch(|| body(self))
    }

    /// Mutate the entries directly without notifying observers.
    pub fn silent_update<R>(&self, body: impl FnOnce(&mut OrderedEntries<K, V>) -> R) -> R {
        self.store.silent(body)
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// Observe the dictionary: `Initial` immediately, then every diff.
    pub fn observe(
        &self,
        observer: impl Fn(&DictionaryEvent<K, V>) + Send + Sync + 'static,
    ) -> AnyDisposable {
        self.to_signal().observe_next(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.store.observer_count()
    }
}

impl<K, V> AsSignal<DictionaryEvent<K, V>> for ObservableDictionary<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn to_signal(&self) -> Signal<DictionaryEvent<K, V>> {
        let store = self.store.clone();
        Signal::new(move |observer| store.subscribe(observer))
    }
}

impl<K, V> Default for ObservableDictionary<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for ObservableDictionary<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.snapshot().iter()).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
