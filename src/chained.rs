use std::{fmt, iter, mem, slice};

use log::{debug, trace};

use crate::{
    hash::{HashFn, KeyHasher, additive_hash},
    prime::{next_prime, prime_target},
};

/// Capacity used by `Default`
const DEFAULT_CAPACITY: usize = 11;

/// Load factor at which `put` doubles the table before inserting
pub const MAX_LOAD_FACTOR: f64 = 1.0;

/// A node of a bucket chain
#[derive(Debug)]
struct Node<V> {
    /// The key in the key-value pair
    key: String,
    /// The value associated with the key
    value: V,
    /// The rest of the chain
    next: Option<Box<Node<V>>>,
}

/// Singly linked list of the pairs hashing to one bucket
struct Chain<V> {
    /// First node, the most recently pushed
    head: Option<Box<Node<V>>>,
    /// Number of nodes
    len: usize,
}

impl<V> Chain<V> {
    /// Creates an empty chain
    const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Number of nodes in the chain
    const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the chain has no nodes
    const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pushes a pair at the head without looking for duplicates
    fn push_front(&mut self, key: String, value: V) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { key, value, next }));
        self.len = self.len.saturating_add(1);
    }

    /// Value stored under `key`
    fn value(&self, key: &str) -> Option<&V> {
        self.iter().find(|(candidate, _)| *candidate == key).map(|(_, value)| value)
    }

    /// Mutable value stored under `key`
    fn value_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut link = self.head.as_deref_mut();
        while let Some(node) = link {
            if node.key == key {
                return Some(&mut node.value);
            }
            link = node.next.as_deref_mut();
        }
        None
    }

    /// Unlinks the node holding `key` and returns its value
    fn remove(&mut self, key: &str) -> Option<V> {
        let mut link = &mut self.head;
        while link.as_ref().is_some_and(|node| node.key != key) {
            link = &mut link.as_mut()?.next;
        }

        let removed = link.take()?;
        let Node { value, next, .. } = *removed;
        *link = next;
        self.len = self.len.saturating_sub(1);
        Some(value)
    }

    /// Iterates the pairs from head to tail
    fn iter(&self) -> ChainIter<'_, V> {
        ChainIter { next: self.head.as_deref() }
    }
}

// Unlink node by node; the default recursive drop can overflow on long chains.
impl<V> Drop for Chain<V> {
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
    }
}

impl<V: Clone> Clone for Chain<V> {
    fn clone(&self) -> Self {
        let pairs: Vec<(&str, &V)> = self.iter().collect();
        let mut chain = Self::new();
        for (key, value) in pairs.into_iter().rev() {
            chain.push_front(key.to_owned(), value.clone());
        }
        chain
    }
}

impl<V: fmt::Debug> fmt::Debug for Chain<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over the pairs of a single chain
#[derive(Debug)]
struct ChainIter<'a, V> {
    /// Node to yield next
    next: Option<&'a Node<V>>,
}

impl<'a, V> Iterator for ChainIter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some((node.key.as_str(), &node.value))
    }
}

/// A string-keyed hash map resolving collisions with separate chaining.
///
/// Every bucket owns a singly linked chain; new keys are pushed at the head
/// of their bucket's chain. The capacity is always prime.
///
/// Note: This implementation is not thread-safe.
#[derive(Clone)]
pub struct ChainedMap<V, H = HashFn> {
    /// One chain per bucket
    buckets: Vec<Chain<V>>,
    /// Number of stored pairs
    size: usize,
    /// Hash function the map was built with
    hasher: H,
}

/// Builds `capacity` empty chains
fn fresh_buckets<V>(capacity: usize) -> Vec<Chain<V>> {
    iter::repeat_with(Chain::new).take(capacity).collect()
}

/// True if `size` pairs can be replayed into `capacity` buckets without
/// any of the insertions seeing the load threshold
#[allow(clippy::arithmetic_side_effects)]
fn replay_fits(size: usize, capacity: usize) -> bool {
    size == 0 || size - 1 < capacity
}

impl<V> ChainedMap<V> {
    /// Creates a map with at least `capacity` buckets hashing keys with `additive_hash`
    ///
    /// # Panics
    ///
    /// Panics if no prime at or above `capacity` fits in `usize`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, additive_hash)
    }
}

impl<V> Default for ChainedMap<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V, H: KeyHasher> ChainedMap<V, H> {
    /// Creates a map with `next_prime(capacity)` buckets and the given hash function
    ///
    /// # Panics
    ///
    /// Panics if no prime at or above `capacity` fits in `usize`.
    #[must_use]
    pub fn new(capacity: usize, hasher: H) -> Self {
        Self { buckets: fresh_buckets(next_prime(capacity)), size: 0, hasher }
    }

    /// Bucket index of `key`
    fn bucket_index(&self, key: &str) -> usize {
        self.hasher.hash_key(key).checked_rem(self.buckets.len()).unwrap_or(0)
    }

    /// Chain `key` hashes to
    fn bucket(&self, key: &str) -> Option<&Chain<V>> {
        self.buckets.get(self.bucket_index(key))
    }

    /// Insert or update a key-value pair, doubling the table first once it is full.
    ///
    /// Returns the previous value if the key was present.
    pub fn put(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.maybe_grow();
        self.insert_one(key.into(), value)
    }

    /// Doubles the table if the load factor has reached `MAX_LOAD_FACTOR`
    fn maybe_grow(&mut self) {
        if self.table_load() >= MAX_LOAD_FACTOR {
            let current = self.capacity();
            let doubled = current.saturating_mul(2);
            debug_assert!(doubled > current, "growth must increase capacity");
            self.resize(doubled);
        }
    }

    /// Updates the pair in place or pushes it onto its chain, ignoring the load factor
    fn insert_one(&mut self, key: String, value: V) -> Option<V> {
        let index = self.bucket_index(&key);
        // `bucket_index` is always below the bucket count
        let chain = self.buckets.get_mut(index)?;
        if let Some(slot) = chain.value_mut(&key) {
            return Some(mem::replace(slot, value));
        }
        chain.push_front(key, value);
        self.size = self.size.saturating_add(1);
        None
    }

    /// Retrieve a value for a given key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.bucket(key)?.value(key)
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.bucket_index(key);
        self.buckets.get_mut(index)?.value_mut(key)
    }

    /// Returns true if the map holds `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Unlinks `key` from its chain and returns its value; absent keys are ignored
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.bucket_index(key);
        let removed = self.buckets.get_mut(index)?.remove(key)?;
        self.size = self.size.saturating_sub(1);
        Some(removed)
    }

    /// Rebuilds the table with at least `new_capacity` buckets.
    ///
    /// Does nothing when `new_capacity` is zero. Otherwise the capacity
    /// becomes the target itself if prime, else the next prime, doubled
    /// further while replaying every pair would fill the table.
    ///
    /// # Panics
    ///
    /// Panics if no prime capacity that large fits in `usize`, or if the
    /// rebuilt table does not hold exactly the pairs it held before, which
    /// means the map's bookkeeping is corrupted.
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity < 1 {
            trace!("resize to {new_capacity} ignored");
            return;
        }

        let mut capacity = prime_target(new_capacity);
        while !replay_fits(self.size, capacity) {
            capacity = next_prime(capacity.saturating_mul(2));
        }
        debug!("resizing chained map from {} to {capacity} buckets", self.capacity());

        let previous = mem::replace(&mut self.buckets, fresh_buckets(capacity));
        let expected = self.size;
        self.size = 0;

        for mut chain in previous {
            // Pop from the head so the old chain never holds moved-out nodes
            while let Some(node) = chain.head.take() {
                let Node { key, value, next } = *node;
                chain.head = next;
                let _replaced = self.insert_one(key, value);
            }
        }

        assert_eq!(
            self.size, expected,
            "resize to {capacity} buckets replayed {} of {expected} pairs",
            self.size
        );
    }
}

impl<V, H> ChainedMap<V, H> {
    /// Returns the number of stored pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of buckets, always a prime
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the ratio of stored pairs to buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn table_load(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    /// Returns the number of buckets with an empty chain
    #[must_use]
    pub fn empty_buckets(&self) -> usize {
        self.buckets.iter().filter(|chain| chain.is_empty()).count()
    }

    /// Length of the longest chain
    #[must_use]
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Chain::len).max().unwrap_or(0)
    }

    /// Removes every pair, keeping the capacity
    pub fn clear(&mut self) {
        trace!("clearing chained map of {} pairs", self.size);
        self.buckets = fresh_buckets(self.buckets.len());
        self.size = 0;
    }

    /// Returns an iterator over the pairs in bucket order, then chain order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { buckets: self.buckets.iter(), chain: ChainIter { next: None } }
    }
}

impl<V: Clone, H> ChainedMap<V, H> {
    /// Returns every pair in bucket order, then chain order
    #[must_use]
    pub fn export_entries(&self) -> Vec<(String, V)> {
        self.iter().map(|(key, value)| (key.to_owned(), value.clone())).collect()
    }
}

impl<K, V, H> Extend<(K, V)> for ChainedMap<V, H>
where
    K: Into<String>,
    H: KeyHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<V: fmt::Debug, H> fmt::Debug for ChainedMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedMap")
            .field("size", &self.size)
            .field("buckets", &self.buckets)
            .finish_non_exhaustive()
    }
}

/// One line per bucket: `index: (key: value) -> (key: value)`
impl<V: fmt::Display, H> fmt::Display for ChainedMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, chain) in self.buckets.iter().enumerate() {
            write!(f, "{index}:")?;
            for (position, (key, value)) in chain.iter().enumerate() {
                let separator = if position == 0 { " " } else { " -> " };
                write!(f, "{separator}({key}: {value})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<'a, V, H> IntoIterator for &'a ChainedMap<V, H> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cursor over the pairs of a `ChainedMap`
#[derive(Debug)]
pub struct Iter<'a, V> {
    /// Buckets not yet visited
    buckets: slice::Iter<'a, Chain<V>>,
    /// Remainder of the chain being walked
    chain: ChainIter<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.chain.next() {
                return Some(pair);
            }
            self.chain = self.buckets.next()?.iter();
        }
    }
}
