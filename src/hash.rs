//! String hash functions and the strategy trait the maps are built over

/// Plain function pointer hasher, the default hasher type of both maps
pub type HashFn = fn(&str) -> usize;

/// A deterministic hash from a string key to a non-negative integer.
///
/// The maps only rely on determinism; distribution quality is up to the
/// implementation. Any `Fn(&str) -> usize` is a `KeyHasher`.
pub trait KeyHasher {
    /// Hashes `key`
    fn hash_key(&self, key: &str) -> usize;
}

impl<F> KeyHasher for F
where
    F: Fn(&str) -> usize,
{
    fn hash_key(&self, key: &str) -> usize {
        self(key)
    }
}

/// Sums the code points of the key.
///
/// Anagrams collide, which makes it handy for exercising collision paths.
#[must_use]
pub fn additive_hash(key: &str) -> usize {
    key.chars().fold(0_usize, |hash, c| hash.wrapping_add(c as usize))
}

/// Sums each code point weighted by its one-based position in the key
#[must_use]
pub fn positional_hash(key: &str) -> usize {
    key.chars()
        .zip(1_usize..)
        .fold(0_usize, |hash, (c, position)| hash.wrapping_add(position.wrapping_mul(c as usize)))
}
