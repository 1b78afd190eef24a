//! Generic layered key-value sub-cache.
//!
//! A view is a shared, immutable base map. A delta records its own overlay on
//! top of the base plus the frozen overlays of the deltas it was nested in.
//! `None` in an overlay marks a removal.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

type Overlay<K, V> = HashMap<K, Option<V>>;

/// Read access shared by views and deltas.
pub trait SubCacheRead<K, V>: Send + Sync {
    fn find(&self, key: &K) -> Option<&V>;

    fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }
}

/// Immutable snapshot of one sub-cache.
#[derive(Debug)]
pub struct SubCacheView<K, V> {
    base: Arc<HashMap<K, V>>,
}

impl<K, V> Clone for SubCacheView<K, V> {
    fn clone(&self) -> Self {
        Self {
            base: Arc::clone(&self.base),
        }
    }
}

impl<K, V> Default for SubCacheView<K, V> {
    fn default() -> Self {
        Self {
            base: Arc::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V> SubCacheView<K, V> {
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.base.iter()
    }
}

impl<K, V> SubCacheRead<K, V> for SubCacheView<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn find(&self, key: &K) -> Option<&V> {
        self.base.get(key)
    }
}

/// Mutable overlay over a [`SubCacheView`].
///
/// The delta's own changes sit behind an `Arc` so that nesting shares them with
/// the nested delta instead of copying them. Writes go through
/// `Arc::make_mut`, which copies only while a nested delta still holds them.
#[derive(Debug)]
pub struct SubCacheDelta<K, V> {
    base: SubCacheView<K, V>,
    layers: Vec<Arc<Overlay<K, V>>>,
    changes: Arc<Overlay<K, V>>,
}

impl<K, V> SubCacheDelta<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new(base: SubCacheView<K, V>) -> Self {
        Self {
            base,
            layers: Vec::new(),
            changes: Arc::new(HashMap::new()),
        }
    }

    fn lookup(&self, key: &K) -> Option<Option<&V>> {
        if let Some(value) = self.changes.get(key) {
            return Some(value.as_ref());
        }
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(key).map(Option::as_ref))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match self.lookup(key) {
            Some(value) => value,
            None => self.base.base.get(key),
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        Arc::make_mut(&mut self.changes).insert(key, Some(value));
    }

    pub fn remove(&mut self, key: &K) {
        if self.get(key).is_some() {
            Arc::make_mut(&mut self.changes).insert(key.clone(), None);
        }
    }

    /// Apply `f` to a copy of the value at `key` and store the result.
    ///
    /// Returns `None` without changes when the key is absent.
    pub fn update<T>(&mut self, key: &K, f: impl FnOnce(&mut V) -> T) -> Option<T> {
        let mut value = self.get(key)?.clone();
        let out = f(&mut value);
        Arc::make_mut(&mut self.changes).insert(key.clone(), Some(value));
        Some(out)
    }

    /// Keys with values added or replaced by this delta (not by its parents).
    pub fn added(&self) -> impl Iterator<Item = (&K, &V)> {
        self.changes
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|value| (key, value)))
    }

    /// Keys removed by this delta (not by its parents).
    pub fn removed(&self) -> impl Iterator<Item = &K> {
        self.changes
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Start a nested delta that reads through this one's changes.
    ///
    /// The current changes become a shared layer of the nested delta; nothing
    /// is copied.
    pub(crate) fn nested(&self) -> Self {
        let mut layers = self.layers.clone();
        if !self.changes.is_empty() {
            layers.push(Arc::clone(&self.changes));
        }
        Self {
            base: self.base.clone(),
            layers,
            changes: Arc::new(HashMap::new()),
        }
    }

    /// Fold a nested delta's own changes into this one.
    ///
    /// The nested delta's layers are released first, so this delta's changes
    /// are normally unshared again and extended in place.
    pub(crate) fn absorb(&mut self, nested: Self) {
        let Self {
            layers, changes, ..
        } = nested;
        drop(layers);
        let changes = Arc::try_unwrap(changes).unwrap_or_else(|shared| (*shared).clone());
        Arc::make_mut(&mut self.changes).extend(changes);
    }

    /// Materialize base, layers and changes into a new view.
    pub(crate) fn into_view(self) -> SubCacheView<K, V> {
        let has_overlays = !self.changes.is_empty() || !self.layers.is_empty();
        if !has_overlays {
            return self.base;
        }

        let mut merged = Arc::try_unwrap(self.base.base).unwrap_or_else(|shared| (*shared).clone());
        let changes = Arc::try_unwrap(self.changes).unwrap_or_else(|shared| (*shared).clone());
        let overlays = self
            .layers
            .iter()
            .flat_map(|layer| layer.iter())
            .map(|(key, value)| (key.clone(), value.clone()))
            .chain(changes);
        for (key, value) in overlays {
            match value {
                Some(value) => {
                    merged.insert(key, value);
                }
                None => {
                    merged.remove(&key);
                }
            }
        }
        SubCacheView {
            base: Arc::new(merged),
        }
    }
}

impl<K, V> SubCacheRead<K, V> for SubCacheDelta<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn find(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}
