//! # friendgraph
//!
//! A user directory with per-user friend lists, stored as documents in a
//! key-value engine.
//!
//! ## Core Principles
//!
//! - **Validated Writes**: Every id a write refers to must exist at write time
//! - **Monotonic Ids**: User ids come from a persisted, atomically incremented sequence
//! - **Cascading Deletes**: Deleting a user scrubs it from every friend list
//! - **Zero Magic**: Explicit contexts, explicit open and close
//! - **Persistence Primary**: Durable storage with RocksDB
//!
//! ## Architecture
//!
//! ```text
//! Caller (HTTP handlers, CLI, ...)
//!     ↓
//! GraphStore (validation, friend edges, cascade)
//!     ↓
//! SequenceCounter  +  UserRecordStore
//!     ↓
//! Storage Backend (RocksDB, memory)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use friendgraph::GraphStore;
//!
//! # fn example() -> friendgraph::Result<()> {
//! let store = GraphStore::in_memory();
//! let ctx = store.context();
//!
//! let alice = store.create_user(&ctx, "Alice", 30)?;
//! let bob = store.create_user(&ctx, "Bob", 25)?;
//!
//! // Alice shows up in Bob's friend list; Alice's own list is unchanged
//! store.add_friend(&ctx, alice, bob)?;
//! assert_eq!(store.get_friends(&ctx, bob)?[0].name, "Alice");
//!
//! assert_eq!(store.delete_user(&ctx, alice)?, "Alice");
//! assert!(store.get_friends(&ctx, bob)?.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod storage;

// Re-export main types
pub use config::{BackendConfig, StoreConfig};
pub use context::{CancelHandle, OpContext};
pub use error::{ErrorKind, GraphError, Result};
pub use graph::{
    Counter, GraphStore, SequenceCounter, User, UserId, UserMutation, UserRecordStore,
    USER_ID_SEQUENCE,
};
#[cfg(feature = "rocksdb-backend")]
pub use storage::RocksDBBackend;
pub use storage::{MemoryBackend, StorageBackend};
