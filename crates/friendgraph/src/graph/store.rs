//! Main GraphStore interface: users, friend edges, cascading deletes.
//!
//! Operations are short validate → read → mutate sequences. Each single-record
//! step is atomic in the backend, but the sequence as a whole is not, and no
//! lock is held across steps. Residual race windows:
//!
//! - `delete_user(x)` racing `add_friend(x, y)`: the friend check can pass
//!   before the delete and the append land after the scrub, leaving `x` in
//!   `y`'s friend list.
//! - A crash or expired context between the delete and the scrub of
//!   `delete_user` leaves dangling references to the deleted id.
//! - `create_user` burns its id if the insert fails; ids are never reused.

use super::counter::SequenceCounter;
use super::records::UserRecordStore;
use super::types::{User, UserId, UserMutation};
use crate::config::{default_operation_timeout, BackendConfig, StoreConfig};
use crate::context::OpContext;
use crate::error::{GraphError, Result};
use crate::storage::{MemoryBackend, StorageBackend};
use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Sequence that user ids are drawn from.
pub const USER_ID_SEQUENCE: &str = "user_id";

/// The user/friend graph store.
///
/// `GraphStore` is `Send + Sync` and holds no locks of its own; open it once at
/// startup and share it (by reference or `Arc`) with every request handler.
pub struct GraphStore {
    storage: Arc<dyn StorageBackend>,
    counter: SequenceCounter,
    users: UserRecordStore,
    operation_timeout: Option<Duration>,
}

/// Gate a persistence step on the context and label its failure.
fn run_step<T>(ctx: &OpContext, step: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    ctx.check(step)?;
    f().map_err(|e| e.at_step(step))
}

/// A record that vanished between validation and mutation reads as undefined.
fn undefined_if_missing(err: GraphError, requested: &[UserId]) -> GraphError {
    match err {
        GraphError::NotFound { id } => GraphError::UndefinedIndexes {
            requested: requested.to_vec(),
            missing: vec![id],
        },
        other => other,
    }
}

impl GraphStore {
    /// Create a store over an already opened backend.
    ///
    /// Uses the default operation timeout; see
    /// [`with_operation_timeout`](Self::with_operation_timeout).
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            counter: SequenceCounter::new(Arc::clone(&backend)),
            users: UserRecordStore::new(Arc::clone(&backend)),
            storage: backend,
            operation_timeout: default_operation_timeout(),
        }
    }

    /// Open the store described by `config`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use friendgraph::{GraphStore, StoreConfig};
    ///
    /// let store = GraphStore::open(&StoreConfig::rocksdb("./friends.db")).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the database cannot be opened.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let backend: Arc<dyn StorageBackend> = match &config.backend {
            BackendConfig::Memory => {
                info!("Opening in-memory graph store");
                Arc::new(MemoryBackend::new())
            }
            #[cfg(feature = "rocksdb-backend")]
            BackendConfig::Rocksdb { path } => {
                use crate::storage::RocksDBBackend;
                info!("Opening graph store at path: {path:?}");
                Arc::new(RocksDBBackend::open(path)?.with_sync_writes(config.sync_writes))
            }
            #[cfg(not(feature = "rocksdb-backend"))]
            BackendConfig::Rocksdb { path } => {
                return Err(GraphError::storage(
                    format!("Cannot open {path:?}: built without the rocksdb-backend feature"),
                    None::<std::io::Error>,
                ));
            }
        };

        Ok(Self::with_backend(backend).with_operation_timeout(config.operation_timeout))
    }

    /// Create an in-memory store for testing.
    ///
    /// **Warning**: All data is lost when the store is dropped.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    /// Set the timeout applied by [`context`](Self::context).
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// A fresh operation context using the configured timeout.
    pub fn context(&self) -> OpContext {
        OpContext::from_timeout(self.operation_timeout)
    }

    /// Create a user with an empty friend list and return its new id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if issuing the id or inserting
    /// fails. An id issued before a failed insert is not reused.
    pub fn create_user(&self, ctx: &OpContext, name: &str, age: i64) -> Result<UserId> {
        debug!("Creating user: name={name}, age={age}");
        let id = run_step(ctx, "create_user: issue id", || {
            self.counter.next(USER_ID_SEQUENCE)
        })?;

        run_step(ctx, "create_user: insert user", || {
            self.users.insert(&User::new(id, name, age))
        })
        .inspect_err(|e| warn!("User id {id} burned: {e}"))?;

        trace!("User {id} created");
        Ok(id)
    }

    /// Verify that every id in `ids` names an existing user.
    ///
    /// Duplicate ids collapse before the existence count, so `[1, 1]` passes
    /// when user 1 exists.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UndefinedIndexes`] with the full request and the
    /// ids that were not found.
    pub fn check_ids(&self, ctx: &OpContext, ids: &[UserId]) -> Result<()> {
        let found = run_step(ctx, "check_ids", || self.users.get_many(ids))?;

        let distinct: HashSet<UserId> = ids.iter().copied().collect();
        if distinct.len() == found.len() {
            return Ok(());
        }

        let found: HashSet<UserId> = found.iter().map(|u| u.id).collect();
        let mut missing = Vec::new();
        for &id in ids {
            if !found.contains(&id) && !missing.contains(&id) {
                missing.push(id);
            }
        }

        debug!("Undefined user ids {missing:?} in {ids:?}");
        Err(GraphError::UndefinedIndexes {
            requested: ids.to_vec(),
            missing,
        })
    }

    /// Whether `source_id` is already in `target_id`'s friend list.
    ///
    /// A missing target has no friends, so this returns `false` for it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the read fails.
    pub fn friend_exists(&self, ctx: &OpContext, source_id: UserId, target_id: UserId) -> Result<bool> {
        match run_step(ctx, "friend_exists", || self.users.get(target_id)) {
            Ok(target) => Ok(target.has_friend(source_id)),
            Err(GraphError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Record `source_id` in `target_id`'s friend list.
    ///
    /// The edge is directional: only the target's list changes, the source's
    /// own list is left alone. Callers wanting a mutual friendship add both
    /// directions.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UndefinedIndexes`] if either user doesn't exist
    /// - [`GraphError::FriendshipAlreadyExists`] if the edge is already recorded
    pub fn add_friend(&self, ctx: &OpContext, source_id: UserId, target_id: UserId) -> Result<()> {
        debug!("Adding friend: source={source_id}, target={target_id}");
        let requested = [source_id, target_id];
        self.check_ids(ctx, &requested)?;

        if self.friend_exists(ctx, source_id, target_id)? {
            return Err(GraphError::FriendshipAlreadyExists {
                source_id,
                target_id,
            });
        }

        // The append re-checks membership under the record's own atomic
        // update, so two racing calls cannot both add the edge.
        run_step(ctx, "add_friend: append friend", || {
            self.users
                .update(target_id, UserMutation::AppendFriend(source_id))
        })
        .map_err(|e| undefined_if_missing(e, &requested))?;

        trace!("User {source_id} added to friend list of {target_id}");
        Ok(())
    }

    /// Remove every occurrence of `source_id` from `target_id`'s friend list.
    ///
    /// Removing an edge that isn't there is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UndefinedIndexes`] if the target doesn't exist.
    pub fn remove_friend(&self, ctx: &OpContext, source_id: UserId, target_id: UserId) -> Result<()> {
        debug!("Removing friend: source={source_id}, target={target_id}");
        let requested = [target_id];
        self.check_ids(ctx, &requested)?;

        run_step(ctx, "remove_friend: remove friend", || {
            self.users
                .update(target_id, UserMutation::RemoveFriend(source_id))
        })
        .map_err(|e| undefined_if_missing(e, &requested))?;

        Ok(())
    }

    /// Set a user's age. The friend list is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UndefinedIndexes`] if the user doesn't exist.
    pub fn update_age(&self, ctx: &OpContext, user_id: UserId, new_age: i64) -> Result<()> {
        debug!("Updating age: id={user_id}, age={new_age}");
        let requested = [user_id];
        self.check_ids(ctx, &requested)?;

        run_step(ctx, "update_age: set age", || {
            self.users.update(user_id, UserMutation::SetAge(new_age))
        })
        .map_err(|e| undefined_if_missing(e, &requested))?;

        Ok(())
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UndefinedIndexes`] if the user doesn't exist.
    pub fn get_user(&self, ctx: &OpContext, user_id: UserId) -> Result<User> {
        let requested = [user_id];
        self.check_ids(ctx, &requested)?;

        run_step(ctx, "get_user: fetch user", || self.users.get(user_id))
            .map_err(|e| undefined_if_missing(e, &requested))
    }

    /// Fetch the users listed in `user_id`'s friend list, ascending by id.
    ///
    /// Listed ids that no longer exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UndefinedIndexes`] if the user doesn't exist.
    pub fn get_friends(&self, ctx: &OpContext, user_id: UserId) -> Result<Vec<User>> {
        debug!("Getting friends of user {user_id}");
        let user = self.get_user(ctx, user_id)?;

        let friends = run_step(ctx, "get_friends: fetch friends", || {
            self.users.get_many(&user.friends)
        })?;

        trace!("User {user_id} has {} friends", friends.len());
        Ok(friends)
    }

    /// Delete a user, scrub its id from every friend list, and return its name.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UndefinedIndexes`] if the user doesn't exist
    /// - [`GraphError::StoreUnavailable`] if the delete or the scrub fails; a
    ///   failed scrub leaves the user deleted
    pub fn delete_user(&self, ctx: &OpContext, user_id: UserId) -> Result<String> {
        debug!("Deleting user: id={user_id}");
        let requested = [user_id];
        self.get_user(ctx, user_id)?;

        let deleted = run_step(ctx, "delete_user: delete user", || {
            self.users.delete(user_id)
        })
        .map_err(|e| undefined_if_missing(e, &requested))?;

        let scrubbed = run_step(ctx, "delete_user: scrub friend lists", || {
            self.users.remove_from_all_friend_lists(user_id)
        })
        .inspect_err(|e| warn!("User {user_id} deleted but still referenced: {e}"))?;

        trace!("User {user_id} deleted, removed from {scrubbed} friend lists");
        Ok(deleted.name)
    }

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the scan fails.
    pub fn user_count(&self, ctx: &OpContext) -> Result<usize> {
        run_step(ctx, "user_count", || self.users.count())
    }

    /// Last id handed out, or `None` before the first user is created.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the read fails.
    pub fn last_issued_id(&self, ctx: &OpContext) -> Result<Option<UserId>> {
        run_step(ctx, "last_issued_id", || {
            self.counter.current(USER_ID_SEQUENCE)
        })
    }

    /// Explicitly flush any buffered writes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the flush fails.
    pub fn flush(&self) -> Result<()> {
        debug!("Flushing graph store");
        self.storage.flush()
    }

    /// Close the store and ensure all data is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the final flush fails.
    pub fn close(self) -> Result<()> {
        info!("Closing graph store");
        self.flush()
    }
}
