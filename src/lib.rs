//! # Prime Map
//!
//! String-keyed hash maps whose capacity is always a prime number.
//!
//! This crate provides two hash map implementations:
//!
//! - `OpenAddressingMap`: quadratic probing over a single slot array, with
//!   tombstones for removed keys; grows once half full
//! - `ChainedMap`: separate chaining with a singly linked list per bucket;
//!   grows once the number of pairs reaches the number of buckets
//!
//! Both take the hash function as a value at construction time, and both
//! implement the `StringMap` trait. `find_mode` is a small client of
//! `ChainedMap` returning the most frequent elements of a sequence.
//!
//! ## Basic Usage
//!
//! ```rust
//! use primemap::OpenAddressingMap;
//!
//! // Capacity is rounded up to the next prime
//! let mut map = OpenAddressingMap::with_capacity(20);
//! assert_eq!(map.capacity(), 23);
//!
//! // Insert values
//! map.put("apple", 1);
//! map.put("banana", 2);
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Update values
//! map.put("apple", 10);
//! assert_eq!(map.get("apple"), Some(&10));
//!
//! // Remove values
//! map.remove("apple");
//! assert_eq!(map.get("apple"), None);
//! assert_eq!(map.len(), 1);
//! ```
//!
//! ## Custom Hash Functions
//!
//! ```rust
//! use primemap::{ChainedMap, positional_hash};
//!
//! let mut map = ChainedMap::new(11, positional_hash);
//! map.put("ab", 1);
//! map.put("ba", 2);
//!
//! // Any `Fn(&str) -> usize` works, closures included
//! let mut lengths = ChainedMap::new(5, |key: &str| key.len());
//! lengths.put("three", 3);
//! assert_eq!(lengths.get("three"), Some(&3));
//! ```

/// Module implementing the separate chaining map
pub mod chained;
/// Serializable map settings
mod config;
/// Configuration errors
mod error;
/// Hash functions and the hasher strategy trait
mod hash;
/// Most frequent elements of a sequence
mod mode;
/// Module implementing the quadratic probing map
pub mod open_addressing;
/// Prime capacity helpers
mod prime;
/// The shared map contract and helpers
mod utils;

pub use chained::ChainedMap;
pub use config::{HashFunction, MAX_CAPACITY, MapConfig};
pub use error::ConfigError;
pub use hash::{HashFn, KeyHasher, additive_hash, positional_hash};
pub use mode::find_mode;
pub use open_addressing::OpenAddressingMap;
pub use prime::{is_prime, next_prime};
pub use utils::{StringMap, from_pairs};
