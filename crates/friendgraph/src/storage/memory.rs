//! In-memory storage backend for testing.
//!
//! **Note**: This backend is for testing only. Do not use in production.
//! All data is lost when the backend is dropped.

use super::{lock_poisoned, KeyValue, StorageBackend, UpdateFn};
use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory storage backend using a BTreeMap.
///
/// Data is stored in a thread-safe `BTreeMap` behind an `Arc<RwLock<>>`.
/// [`update`](StorageBackend::update) holds the write lock for the whole
/// read-modify-write, which makes it atomic per key (and, in fact, globally).
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of key-value pairs stored.
    ///
    /// # Errors
    ///
    /// Fails only if the lock was poisoned by a panicking writer.
    pub fn len(&self) -> Result<usize> {
        Ok(self.data.read().map_err(lock_poisoned)?.len())
    }

    /// Check if the backend is empty.
    ///
    /// # Errors
    ///
    /// Fails only if the lock was poisoned by a panicking writer.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().map_err(lock_poisoned)?.get(key).cloned())
    }

    fn multi_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        let data = self.data.read().map_err(lock_poisoned)?;
        Ok(keys.iter().map(|key| data.get(key).cloned()).collect())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let data = self.data.read().map_err(lock_poisoned)?;
        let results: Vec<KeyValue> = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn update(&self, key: &[u8], f: &mut UpdateFn<'_>) -> Result<()> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        if let Some(value) = f(data.get(key).map(Vec::as_slice))? {
            data.insert(key.to_vec(), value);
        }
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.write().map_err(lock_poisoned)?.remove(key))
    }

    fn flush(&self) -> Result<()> {
        // No-op for in-memory backend
        Ok(())
    }
}
