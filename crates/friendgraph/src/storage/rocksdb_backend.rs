//! RocksDB storage backend for production use.
//!
//! This backend provides crash-safe, persistent storage with write-ahead logging.
//! All writes are durable immediately (no deferred writes).

use super::{lock_poisoned, KeyValue, StorageBackend, UpdateFn};
use crate::error::{GraphError, Result};
use rocksdb::{Options, WriteOptions, DB};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// RocksDB-backed persistent storage.
///
/// This is the production storage backend. It provides:
/// - Crash-safe writes with WAL
/// - Atomic per-key read-modify-write
/// - Efficient prefix scans
/// - Durability guarantees
///
/// RocksDB allows a single process to hold a database open, so an in-process
/// write lock is enough to serialize `update` and `remove` calls. Plain reads
/// never take the lock.
#[derive(Clone)]
pub struct RocksDBBackend {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
    sync_writes: bool,
}

impl RocksDBBackend {
    /// Open or create a RocksDB database at the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory path for the database files
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        Self::open_with_options(path, opts)
    }

    /// Open a RocksDB database with custom options.
    ///
    /// For advanced use cases where specific RocksDB tuning is needed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the database cannot be opened.
    pub fn open_with_options<P: AsRef<Path>>(path: P, opts: Options) -> Result<Self> {
        let db = DB::open(&opts, path.as_ref()).map_err(|e| {
            GraphError::storage(
                format!("Failed to open RocksDB at {:?}", path.as_ref()),
                Some(e),
            )
        })?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            sync_writes: false,
        })
    }

    /// Fsync the WAL on every write.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    fn write_options(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts
    }
}

impl StorageBackend for RocksDBBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(|e| GraphError::storage("Failed to get value", Some(e)))
    }

    fn multi_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        self.db
            .multi_get(keys)
            .into_iter()
            .map(|r| r.map_err(|e| GraphError::storage("Failed to multi-get values", Some(e))))
            .collect()
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let mut results = Vec::new();
        let iter = self.db.prefix_iterator(prefix);

        for item in iter {
            let (key, value) = item.map_err(|e| {
                GraphError::storage("Failed to iterate over prefix", Some(e))
            })?;

            // RocksDB prefix iterator may return keys beyond the prefix
            // so we need to check explicitly
            if !key.starts_with(prefix) {
                break;
            }

            results.push((key.to_vec(), value.to_vec()));
        }

        Ok(results)
    }

    fn update(&self, key: &[u8], f: &mut UpdateFn<'_>) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(lock_poisoned)?;

        let current = self
            .db
            .get(key)
            .map_err(|e| GraphError::storage("Failed to read value for update", Some(e)))?;

        if let Some(value) = f(current.as_deref())? {
            self.db
                .put_opt(key, value, &self.write_options())
                .map_err(|e| GraphError::storage("Failed to write updated value", Some(e)))?;
        }

        Ok(())
    }

    fn remove(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let _guard = self.write_lock.lock().map_err(lock_poisoned)?;

        let current = self
            .db
            .get(key)
            .map_err(|e| GraphError::storage("Failed to read value for removal", Some(e)))?;

        if current.is_some() {
            self.db
                .delete_opt(key, &self.write_options())
                .map_err(|e| GraphError::storage("Failed to delete key", Some(e)))?;
        }

        Ok(current)
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| GraphError::storage("Failed to flush database", Some(e)))
    }
}
