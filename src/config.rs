//! Serializable settings for building either map

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    ChainedMap, ConfigError, OpenAddressingMap,
    hash::{HashFn, additive_hash, positional_hash},
};

/// Largest capacity a config may request
pub const MAX_CAPACITY: usize = 1 << 30;

/// Which of the bundled hash functions a map uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashFunction {
    /// `additive_hash`
    #[default]
    Additive,
    /// `positional_hash`
    Positional,
}

impl HashFunction {
    /// The function this variant names
    #[must_use]
    pub fn as_fn(self) -> HashFn {
        match self {
            Self::Additive => additive_hash,
            Self::Positional => positional_hash,
        }
    }
}

/// Initial capacity and hash function for a map.
///
/// Missing fields fall back to the defaults: capacity 11, additive hashing.
///
/// ```rust
/// use primemap::{HashFunction, MapConfig};
///
/// let config = MapConfig::from_json(r#"{ "capacity": 50, "hash": "positional" }"#).unwrap();
/// assert_eq!(config.hash, HashFunction::Positional);
///
/// let mut map = config.build_open();
/// map.put("key1", 10);
/// assert_eq!(map.capacity(), 53);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Requested capacity, rounded up to a prime when the map is built
    pub capacity: usize,
    /// Hash function for keys
    pub hash: HashFunction,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { capacity: 11, hash: HashFunction::default() }
    }
}

impl MapConfig {
    /// Parses and validates a JSON config
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or unknown fields and
    /// `ConfigError::CapacityTooLarge` if the capacity exceeds `MAX_CAPACITY`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise the
    /// errors of [`MapConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&json)
    }

    /// Checks the capacity bound
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CapacityTooLarge` if the capacity exceeds `MAX_CAPACITY`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge { requested: self.capacity, max: MAX_CAPACITY });
        }
        Ok(())
    }

    /// Builds an empty open addressing map from this config
    #[must_use]
    pub fn build_open<V>(&self) -> OpenAddressingMap<V> {
        OpenAddressingMap::new(self.capacity, self.hash.as_fn())
    }

    /// Builds an empty chained map from this config
    #[must_use]
    pub fn build_chained<V>(&self) -> ChainedMap<V> {
        ChainedMap::new(self.capacity, self.hash.as_fn())
    }
}
