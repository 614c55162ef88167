//! The map contract shared by both collision strategies, and helpers built on it

use crate::{ChainedMap, OpenAddressingMap, hash::KeyHasher};

/// Operations every string-keyed map in this crate supports
pub trait StringMap<V> {
    /// Inserts or updates `key`, returning the previous value
    fn put(&mut self, key: String, value: V) -> Option<V>;

    /// Returns the value stored under `key`
    fn get(&self, key: &str) -> Option<&V>;

    /// Removes `key`, returning its value
    fn remove(&mut self, key: &str) -> Option<V>;

    /// Rebuilds the table with at least `new_capacity` buckets
    fn resize(&mut self, new_capacity: usize);

    /// Removes every pair, keeping the capacity
    fn clear(&mut self);

    /// Number of stored pairs
    fn len(&self) -> usize;

    /// Number of buckets
    fn capacity(&self) -> usize;

    /// Number of buckets holding no pair
    fn empty_buckets(&self) -> usize;

    /// Every stored pair in storage order
    fn export_entries(&self) -> Vec<(String, V)>
    where
        V: Clone;

    /// Returns true if the map holds `key`
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns true if the map is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ratio of stored pairs to buckets
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    fn table_load(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Returns the keys in storage order
    fn keys(&self) -> Vec<String>
    where
        V: Clone,
    {
        self.export_entries().into_iter().map(|(key, _)| key).collect()
    }

    /// Returns the values in storage order
    fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.export_entries().into_iter().map(|(_, value)| value).collect()
    }
}

impl<V, H: KeyHasher> StringMap<V> for OpenAddressingMap<V, H> {
    fn put(&mut self, key: String, value: V) -> Option<V> {
        Self::put(self, key, value)
    }

    fn get(&self, key: &str) -> Option<&V> {
        Self::get(self, key)
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        Self::remove(self, key)
    }

    fn resize(&mut self, new_capacity: usize) {
        Self::resize(self, new_capacity);
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn capacity(&self) -> usize {
        Self::capacity(self)
    }

    fn empty_buckets(&self) -> usize {
        Self::empty_buckets(self)
    }

    fn export_entries(&self) -> Vec<(String, V)>
    where
        V: Clone,
    {
        Self::export_entries(self)
    }
}

impl<V, H: KeyHasher> StringMap<V> for ChainedMap<V, H> {
    fn put(&mut self, key: String, value: V) -> Option<V> {
        Self::put(self, key, value)
    }

    fn get(&self, key: &str) -> Option<&V> {
        Self::get(self, key)
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        Self::remove(self, key)
    }

    fn resize(&mut self, new_capacity: usize) {
        Self::resize(self, new_capacity);
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn capacity(&self) -> usize {
        Self::capacity(self)
    }

    fn empty_buckets(&self) -> usize {
        Self::empty_buckets(self)
    }

    fn export_entries(&self) -> Vec<(String, V)>
    where
        V: Clone,
    {
        Self::export_entries(self)
    }
}

/// Fills a default-constructed map from key-value pairs, later pairs winning
pub fn from_pairs<M, V, K, I>(pairs: I) -> M
where
    M: StringMap<V> + Default,
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut map = M::default();

    for (key, value) in pairs {
        map.put(key.into(), value);
    }

    map
}
