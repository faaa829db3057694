//! Storage backend abstractions and implementations.
//!
//! This module defines the [`StorageBackend`] trait and provides implementations:
//! - [`RocksDBBackend`]: Production-ready persistent storage
//! - [`MemoryBackend`]: In-memory storage for testing
//!
//! ## Design Philosophy
//!
//! - **Persistence Primary**: RocksDB is the default, memory backend only for tests
//! - **Per-Key Atomicity**: Read-modify-write on a single key is one call
//! - **Fail Fast**: Operations return errors immediately, no silent failures

mod memory;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use memory::MemoryBackend;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDBBackend;

use crate::error::{GraphError, Result};
use std::sync::PoisonError;

/// Key-value pair for storage operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Callback for [`StorageBackend::update`].
///
/// Receives the current value (`None` when the key is absent). Returning
/// `Ok(Some(bytes))` stores `bytes`; `Ok(None)` leaves the key untouched; an
/// error aborts the update and is returned to the caller unchanged.
pub type UpdateFn<'a> = dyn FnMut(Option<&[u8]>) -> Result<Option<Vec<u8>>> + 'a;

/// Trait defining the storage backend interface.
///
/// All methods take `&self`: a backend is shared by every component of a
/// store and by every thread calling into it. Implementations must make
/// [`update`](StorageBackend::update) and [`remove`](StorageBackend::remove)
/// atomic with respect to each other for the same key.
pub trait StorageBackend: Send + Sync {
    /// Retrieve a value by key.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the read fails.
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Retrieve several keys at once. The output lines up with `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if any read fails.
    fn multi_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Iterate over all key-value pairs with keys starting with the given prefix,
    /// in key order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if iteration fails.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>>;

    /// Atomically read, transform and write back a single key.
    ///
    /// No other `update` or `remove` on the same key can interleave between
    /// the read handed to `f` and the write of its result.
    ///
    /// # Errors
    ///
    /// Returns any error produced by `f`, or [`GraphError::StoreUnavailable`]
    /// if the read or write fails.
    fn update(&self, key: &[u8], f: &mut UpdateFn<'_>) -> Result<()>;

    /// Atomically delete a key and return the value it held.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the delete fails.
    /// Returns `Ok(None)` if the key doesn't exist.
    fn remove(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Flush any buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if flush fails.
    fn flush(&self) -> Result<()>;
}

pub(crate) fn lock_poisoned<T>(_: PoisonError<T>) -> GraphError {
    GraphError::storage("Storage lock poisoned", None::<std::io::Error>)
}
