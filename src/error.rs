//! Errors raised while loading map configuration

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading or validating a `MapConfig`
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Couldn't read map config {path}: {source}")]
    Read {
        /// File that failed to open or read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
    /// The config is not valid JSON or has unknown fields
    #[error("Invalid map config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The requested capacity is above `MAX_CAPACITY`
    #[error("Requested capacity {requested} exceeds the maximum of {max}")]
    CapacityTooLarge {
        /// Capacity from the config
        requested: usize,
        /// Largest accepted capacity
        max: usize,
    },
}
