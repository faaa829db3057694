//! Store configuration.
//!
//! A [`StoreConfig`] is read once at startup (typically from JSON) and handed to
//! [`GraphStore::open`](crate::GraphStore::open).

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which storage engine backs the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Persistent RocksDB database at `path`
    Rocksdb {
        /// Database directory, created if missing
        path: PathBuf,
    },
    /// In-memory map, lost on drop (tests only)
    Memory,
}

/// Configuration for a [`GraphStore`](crate::GraphStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Storage engine
    pub backend: BackendConfig,

    /// Default per-operation timeout (None = no timeout)
    #[serde(with = "duration_option", default = "default_operation_timeout")]
    pub operation_timeout: Option<Duration>,

    /// Fsync the RocksDB WAL on every write
    #[serde(default)]
    pub sync_writes: bool,
}

pub(crate) fn default_operation_timeout() -> Option<Duration> {
    Some(Duration::from_secs(5))
}

// Helper module for serializing Duration as whole seconds
mod duration_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => d.as_secs().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Rocksdb {
                path: PathBuf::from("friendgraph.db"),
            },
            operation_timeout: default_operation_timeout(),
            sync_writes: false,
        }
    }
}

impl StoreConfig {
    /// Config for a persistent store at `path`.
    pub fn rocksdb(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendConfig::Rocksdb { path: path.into() },
            ..Default::default()
        }
    }

    /// Config for an in-memory store.
    pub fn in_memory() -> Self {
        Self {
            backend: BackendConfig::Memory,
            ..Default::default()
        }
    }

    /// Set the default per-operation timeout
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Enable or disable synchronous writes
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Parse a config from JSON. Missing optional fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GraphError::serialization("Failed to parse store config", Some(e)))
    }
}
