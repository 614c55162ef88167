use std::{fmt, iter, mem};

use log::{debug, trace};

use crate::{
    hash::{HashFn, KeyHasher, additive_hash},
    prime::{next_prime, prime_target},
};

/// Capacity used by `Default`
const DEFAULT_CAPACITY: usize = 11;

/// Load factor at which `put` doubles the table before inserting
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// A live key-value pair
#[derive(Debug, Clone)]
struct Entry<V> {
    /// The key in the key-value pair
    key: String,
    /// The value associated with the key
    value: V,
}

/// State of one slot of the table
#[derive(Debug, Clone)]
enum Slot<V> {
    /// Nothing stored since the last rebuild; ends every probe sequence
    Empty,
    /// Holds a live pair
    Live(Entry<V>),
    /// Key of a removed pair; probe sequences continue past it
    Tombstone(String),
}

impl<V> Slot<V> {
    /// Turns a live slot into a tombstone and hands back its value
    fn bury(&mut self) -> Option<V> {
        match mem::replace(self, Self::Empty) {
            Self::Live(Entry { key, value }) => {
                *self = Self::Tombstone(key);
                Some(value)
            }
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Quadratic probe sequence `(hash + j²) mod capacity` for `j = 0..capacity`
#[derive(Debug)]
struct Probe {
    /// Slot index for the current `j`
    index: usize,
    /// Distance to the next index, `2j + 1` reduced modulo capacity
    step: usize,
    /// Probes left before the sequence gives up
    remaining: usize,
    /// Table size the sequence wraps around
    capacity: usize,
}

impl Probe {
    /// Starts the sequence for `hash` over a table of `capacity` slots
    fn new(hash: usize, capacity: usize) -> Self {
        let index = hash.checked_rem(capacity).unwrap_or(0);
        let step = 1_usize.checked_rem(capacity).unwrap_or(0);
        Self { index, step, remaining: capacity, capacity }
    }
}

/// `(a + b) mod m` for `a, b < m` without overflowing
#[allow(clippy::arithmetic_side_effects)]
fn add_mod(a: usize, b: usize, m: usize) -> usize {
    let gap = m - a;
    if b >= gap { b - gap } else { a + b }
}

impl Iterator for Probe {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);

        let current = self.index;
        // (j + 1)² - j² = 2j + 1
        self.index = add_mod(self.index, self.step, self.capacity);
        self.step = add_mod(self.step, 2_usize.checked_rem(self.capacity).unwrap_or(0), self.capacity);
        Some(current)
    }
}

/// A string-keyed hash map resolving collisions with quadratic probing.
///
/// The capacity is always prime. Removal leaves a tombstone in the slot so
/// probe sequences of other keys stay intact; tombstones are dropped on resize.
///
/// Note: This implementation is not thread-safe.
#[derive(Clone)]
pub struct OpenAddressingMap<V, H = HashFn> {
    /// The slots of the table
    slots: Vec<Slot<V>>,
    /// Number of live entries
    size: usize,
    /// Hash function the map was built with
    hasher: H,
}

/// Builds `capacity` empty slots
fn empty_slots<V>(capacity: usize) -> Vec<Slot<V>> {
    iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

/// True if `size` entries can be replayed into `capacity` slots without
/// any of the insertions seeing the load threshold
#[allow(clippy::arithmetic_side_effects)]
fn replay_fits(size: usize, capacity: usize) -> bool {
    size == 0 || (size - 1).saturating_mul(2) < capacity
}

impl<V> OpenAddressingMap<V> {
    /// Creates a map with at least `capacity` slots hashing keys with `additive_hash`
    ///
    /// # Panics
    ///
    /// Panics if no prime at or above `capacity` fits in `usize`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, additive_hash)
    }
}

impl<V> Default for OpenAddressingMap<V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<V, H: KeyHasher> OpenAddressingMap<V, H> {
    /// Creates a map with `next_prime(capacity)` slots and the given hash function
    ///
    /// # Panics
    ///
    /// Panics if no prime at or above `capacity` fits in `usize`.
    #[must_use]
    pub fn new(capacity: usize, hasher: H) -> Self {
        Self { slots: empty_slots(next_prime(capacity)), size: 0, hasher }
    }

    /// Probe sequence for `key` over the current table
    fn probe(&self, key: &str) -> Probe {
        Probe::new(self.hasher.hash_key(key), self.slots.len())
    }

    /// Index of the live slot holding `key`
    fn find_index(&self, key: &str) -> Option<usize> {
        for index in self.probe(key) {
            match self.slots.get(index)? {
                // An empty slot ends every probe sequence that could reach the key
                Slot::Empty => return None,
                Slot::Live(entry) if entry.key == key => return Some(index),
                Slot::Live(_) | Slot::Tombstone(_) => {}
            }
        }
        None
    }

    /// Insert or update a key-value pair, doubling the table first if it is half full.
    ///
    /// Returns the previous value if the key was live.
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

    /// Places a pair along its probe sequence without checking the load factor.
    ///
    /// The first tombstone seen is reused, but only once the probe has ruled
    /// out a live entry for the same key further along.
    fn insert_one(&mut self, key: String, value: V) -> Option<V> {
        let mut first_tombstone = None;
        let mut vacant = None;

        for index in self.probe(&key) {
            match self.slots.get_mut(index) {
                None => break,
                Some(Slot::Empty) => {
                    vacant = Some(index);
                    break;
                }
                Some(Slot::Tombstone(_)) => {
                    first_tombstone = first_tombstone.or(Some(index));
                }
                Some(Slot::Live(entry)) if entry.key == key => {
                    return Some(mem::replace(&mut entry.value, value));
                }
                Some(Slot::Live(_)) => {}
            }
        }

        // Below half load the first (capacity + 1) / 2 probes hit distinct
        // slots, so one of them is empty or a tombstone
        if let Some(slot) = first_tombstone.or(vacant).and_then(|index| self.slots.get_mut(index)) {
            *slot = Slot::Live(Entry { key, value });
            self.size = self.size.saturating_add(1);
        }
        None
    }

    /// Retrieve a value for a given key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        match self.slots.get(self.find_index(key)?)? {
            Slot::Live(entry) => Some(&entry.value),
            Slot::Empty | Slot::Tombstone(_) => None,
        }
    }

    /// Get a mutable reference to a value for a given key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.find_index(key)?;
        match self.slots.get_mut(index)? {
            Slot::Live(entry) => Some(&mut entry.value),
            Slot::Empty | Slot::Tombstone(_) => None,
        }
    }

    /// Returns true if the map holds a live entry for `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find_index(key).is_some()
    }

    /// Removes `key`, leaving a tombstone in its slot.
    ///
    /// Returns the removed value; removing an absent key does nothing.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.find_index(key)?;
        let removed = self.slots.get_mut(index)?.bury()?;
        self.size = self.size.saturating_sub(1);
        Some(removed)
    }

    /// Rebuilds the table with room for at least `new_capacity` slots.
    ///
    /// Does nothing when `new_capacity` is below the number of live entries.
    /// Otherwise the capacity becomes the target itself if prime, else the
    /// next prime, doubled further while replaying every live entry would
    /// cross the load threshold. Tombstones are discarded.
    ///
    /// # Panics
    ///
    /// Panics if no prime capacity that large fits in `usize`, or if the
    /// rebuilt table does not hold exactly the entries it held before, which
    /// means the map's bookkeeping is corrupted.
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity < self.size {
            trace!("resize to {new_capacity} ignored, {} live entries", self.size);
            return;
        }

        let mut capacity = prime_target(new_capacity);
        while !replay_fits(self.size, capacity) {
            capacity = next_prime(capacity.saturating_mul(2));
        }
        debug!("resizing open addressing map from {} to {capacity} slots", self.capacity());

        let previous = mem::replace(&mut self.slots, empty_slots(capacity));
        let expected = self.size;
        self.size = 0;

        for slot in previous {
            if let Slot::Live(Entry { key, value }) = slot {
                let _replaced = self.insert_one(key, value);
            }
        }

        assert_eq!(
            self.size, expected,
            "resize to {capacity} slots replayed {} of {expected} entries",
            self.size
        );
    }
}

impl<V, H> OpenAddressingMap<V, H> {
    /// Returns the number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the map has no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots, always a prime
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the ratio of live entries to slots
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn table_load(&self) -> f64 {
        self.size as f64 / self.slots.len() as f64
    }

    /// Returns the number of slots not holding a live entry; tombstones count as empty
    #[must_use]
    pub fn empty_buckets(&self) -> usize {
        self.capacity().saturating_sub(self.size)
    }

    /// Removes every entry, keeping the capacity
    pub fn clear(&mut self) {
        trace!("clearing open addressing map of {} entries", self.size);
        self.slots = empty_slots(self.slots.len());
        self.size = 0;
    }

    /// Returns an iterator over the live key-value pairs in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { slots: &self.slots, index: 0 }
    }
}

impl<V: Clone, H> OpenAddressingMap<V, H> {
    /// Returns every live key-value pair in slot order
    #[must_use]
    pub fn export_entries(&self) -> Vec<(String, V)> {
        self.iter().map(|(key, value)| (key.to_owned(), value.clone())).collect()
    }
}

impl<K, V, H> Extend<(K, V)> for OpenAddressingMap<V, H>
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

impl<V: fmt::Debug, H> fmt::Debug for OpenAddressingMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAddressingMap")
            .field("size", &self.size)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// One line per slot: `index: None`, `index: key => value` or `index: key (deleted)`
impl<V: fmt::Display, H> fmt::Display for OpenAddressingMap<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Empty => writeln!(f, "{index}: None")?,
                Slot::Live(entry) => writeln!(f, "{index}: {} => {}", entry.key, entry.value)?,
                Slot::Tombstone(key) => writeln!(f, "{index}: {key} (deleted)")?,
            }
        }
        Ok(())
    }
}

impl<'a, V, H> IntoIterator for &'a OpenAddressingMap<V, H> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cursor over the live entries of an `OpenAddressingMap`.
///
/// Forward only; the map cannot be changed while the cursor borrows it.
#[derive(Debug, Clone)]
pub struct Iter<'a, V> {
    /// Slots of the map being walked
    slots: &'a [Slot<V>],
    /// Next slot to look at
    index: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.get(self.index) {
            self.index = self.index.saturating_add(1);
            if let Slot::Live(entry) = slot {
                return Some((entry.key.as_str(), &entry.value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash::positional_hash, prime::is_prime};

    #[test]
    fn test_insert_and_get() {
        let mut map = OpenAddressingMap::default();
        assert_eq!(map.put("key1", 1), None);
        assert_eq!(map.put("key2", 2), None);
        assert_eq!(map.put("key3", 3), None);

        assert_eq!(map.get("key1"), Some(&1));
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.get("key3"), Some(&3));
        assert_eq!(map.get("key4"), None);
    }

    #[test]
    fn test_update() {
        let mut map = OpenAddressingMap::default();
        assert_eq!(map.put("key1", 1), None);
        assert_eq!(map.put("key1", 10), Some(1));
        assert_eq!(map.get("key1"), Some(&10));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_leaves_tombstone() {
        let mut map = OpenAddressingMap::with_capacity(11);
        map.put("key1", 1);
        map.put("key2", 2);

        assert_eq!(map.remove("key1"), Some(1));
        assert_eq!(map.get("key1"), None);
        assert!(!map.contains_key("key1"));
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.remove("key1"), None);
        assert_eq!(map.len(), 1);
        assert!(map.to_string().contains("key1 (deleted)"));
    }

    #[test]
    fn test_remove_hands_back_values_without_clone() {
        #[derive(Debug, PartialEq)]
        struct Handle(u32);

        let mut map = OpenAddressingMap::default();
        map.put("a", Handle(1));
        map.put("b", Handle(2));

        assert_eq!(map.remove("a"), Some(Handle(1)));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.get("b"), Some(&Handle(2)));
        assert_eq!(map.len(), 1);

        map.put("a", Handle(3));
        assert_eq!(map.get("a"), Some(&Handle(3)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_reinsert_after_remove_counts_once() {
        let mut map = OpenAddressingMap::with_capacity(11);
        map.put("key1", 1);
        map.remove("key1");

        assert_eq!(map.put("key1", 2), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("key1"), Some(&2));
    }

    #[test]
    fn test_tombstone_does_not_shadow_later_key() {
        // Anagrams share an additive hash, so "ab" lands one probe past "ba"
        let mut map = OpenAddressingMap::with_capacity(11);
        map.put("ba", 1);
        map.put("ab", 2);
        map.remove("ba");

        assert_eq!(map.put("ab", 3), Some(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.export_entries(), vec![("ab".to_string(), 3)]);
    }

    #[test]
    fn test_probe_sequence_is_quadratic() {
        let indices: Vec<usize> = Probe::new(3, 11).take(5).collect();
        assert_eq!(indices, vec![3, 4, 7, 1, 8]);
        assert_eq!(Probe::new(0, 2).count(), 2);
    }

    #[test]
    fn test_put_grows_at_half_load() {
        let mut map = OpenAddressingMap::with_capacity(5);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);
        assert_eq!(map.capacity(), 5);

        // 3 / 5 >= 0.5, so this put doubles first
        map.put("d", 4);
        assert_eq!(map.capacity(), 11);
        assert_eq!(map.len(), 4);
        for (key, value) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            assert_eq!(map.get(key), Some(&value));
        }
    }

    #[test]
    fn test_put_matches_reference_growth() {
        let mut map = OpenAddressingMap::with_capacity(53);
        let mut checkpoints = Vec::new();
        for i in 0..150 {
            map.put(format!("str{i}"), i * 100);
            if i % 25 == 24 {
                checkpoints.push((map.empty_buckets(), map.len(), map.capacity()));
            }
        }

        assert_eq!(
            checkpoints,
            vec![
                (28, 25, 53),
                (57, 50, 107),
                (148, 75, 223),
                (123, 100, 223),
                (324, 125, 449),
                (299, 150, 449),
            ]
        );
    }

    #[test]
    fn test_resize_below_size_is_ignored() {
        let mut map = OpenAddressingMap::new(11, positional_hash);
        for i in 1..6 {
            map.put(i.to_string(), i * 10);
        }
        let before = map.export_entries();

        map.resize(2);
        assert_eq!(map.capacity(), 11);
        assert_eq!(map.export_entries(), before);
    }

    #[test]
    fn test_resize_drops_tombstones_and_keeps_order() {
        let mut map = OpenAddressingMap::new(11, positional_hash);
        for i in 1..6 {
            map.put(i.to_string(), (i * 10).to_string());
        }
        map.put("20", "200".to_string());
        map.remove("1");
        map.resize(12);

        assert_eq!(map.capacity(), 13);
        let keys: Vec<String> = map.export_entries().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["4", "5", "20", "2", "3"]);
        assert!(!map.to_string().contains("deleted"));
    }

    #[test]
    fn test_resize_grows_past_small_targets() {
        let mut map = OpenAddressingMap::new(75, positional_hash);
        for key in (25..1000).step_by(13) {
            map.put(key.to_string(), key * 42);
        }
        assert_eq!((map.len(), map.capacity()), (75, 163));

        for (target, capacity) in [(111, 227), (228, 229), (345, 347), (930, 937)] {
            map.resize(target);
            assert_eq!(map.capacity(), capacity);
            assert!(map.table_load() <= MAX_LOAD_FACTOR);
            for key in (25..1000).step_by(13) {
                assert!(map.contains_key(&key.to_string()));
                assert!(!map.contains_key(&(key + 1).to_string()));
            }
        }
    }

    #[test]
    fn test_resize_to_prime_target() {
        let mut map = OpenAddressingMap::with_capacity(20);
        map.put("key1", 10);
        assert_eq!(map.capacity(), 23);

        map.resize(30);
        assert_eq!(map.capacity(), 31);
        assert!(is_prime(map.capacity()));
        assert_eq!(map.get("key1"), Some(&10));
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut map = OpenAddressingMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        map.put("key1", 1);
        assert!(!map.is_empty());
        map.put("key2", 2);
        assert_eq!(map.len(), 2);

        map.remove("key1");
        map.remove("key2");
        assert!(map.is_empty());
    }

    #[test]
    fn test_iter_skips_tombstones() {
        let mut map = OpenAddressingMap::with_capacity(10);
        for i in 0..5 {
            map.put(i.to_string(), (i * 24).to_string());
        }
        map.remove("0");
        map.remove("4");

        let items: Vec<(&str, &String)> = map.iter().collect();
        let keys: Vec<&str> = items.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["1", "2", "3"]);

        let mut cursor = map.iter();
        assert_eq!(cursor.next().map(|(key, _)| key), Some("1"));
        assert_eq!(cursor.by_ref().count(), 2);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_get_mut() {
        let mut map = OpenAddressingMap::default();
        map.put("key1", 1);

        if let Some(value) = map.get_mut("key1") {
            *value += 10;
        }

        assert_eq!(map.get("key1"), Some(&11));
    }

    #[test]
    fn test_clear() {
        let mut map = OpenAddressingMap::with_capacity(53);
        map.put("key1", 10);
        map.put("key2", 20);
        map.resize(100);
        assert_eq!((map.len(), map.capacity()), (2, 101));

        map.clear();

        assert_eq!((map.len(), map.capacity()), (0, 101));
        assert_eq!(map.get("key1"), None);
        assert_eq!(map.empty_buckets(), 101);
    }

    #[test]
    fn test_table_load() {
        let mut map = OpenAddressingMap::with_capacity(101);
        assert!(map.table_load().abs() < f64::EPSILON);
        map.put("key1", 10);
        map.put("key2", 20);
        map.put("key1", 30);
        assert!((map.table_load() - 2.0 / 101.0).abs() < f64::EPSILON);
        assert_eq!(map.empty_buckets(), 99);
    }

    #[test]
    fn test_tombstone_churn_on_one_probe_sequence() {
        for capacity in [2, 3, 5, 7, 11] {
            let mut map = OpenAddressingMap::new(capacity, |_: &str| 0_usize);
            for round in 0..300 {
                for i in 0..40 {
                    map.put(format!("k{i}"), round);
                }
                assert_eq!(map.len(), 40);
                for i in 0..40 {
                    assert_eq!(map.remove(&format!("k{i}")), Some(round));
                }
                assert!(map.is_empty());
                map.resize(round % 17);
                assert!(is_prime(map.capacity()));
            }
        }
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_resize_past_usize_panics() {
        let mut map: OpenAddressingMap<i32> = OpenAddressingMap::default();
        map.resize(usize::MAX);
    }

    #[test]
    fn test_colliding_hasher_stays_correct() {
        let mut map = OpenAddressingMap::new(3, |_: &str| 0_usize);
        for i in 0..40 {
            map.put(format!("k{i}"), i);
        }
        for i in (0..40).step_by(3) {
            map.remove(&format!("k{i}"));
        }

        for i in 0..40 {
            let expected = if i % 3 == 0 { None } else { Some(&i) };
            assert_eq!(map.get(&format!("k{i}")), expected);
        }
        assert_eq!(map.len(), 26);
    }
}
