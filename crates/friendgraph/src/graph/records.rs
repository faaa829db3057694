//! Persistence of user records keyed by id.

use super::types::{decode, encode, User, UserId, UserMutation};
use crate::error::{GraphError, Result};
use crate::storage::StorageBackend;
use log::{debug, trace};
use std::sync::Arc;

const USER_PREFIX: &str = "user:";

/// Zero-padded so that prefix scans return users in id order.
pub(crate) fn user_key(id: UserId) -> Vec<u8> {
    format!("{USER_PREFIX}{id:020}").into_bytes()
}

/// CRUD over user documents.
///
/// Every single-record write goes through [`StorageBackend::update`] or
/// [`StorageBackend::remove`], so a write never loses a concurrent write to
/// the same record.
#[derive(Clone)]
pub struct UserRecordStore {
    storage: Arc<dyn StorageBackend>,
}

impl UserRecordStore {
    /// Create a record store over the given backend.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateId`] if a user with the same id exists.
    pub fn insert(&self, user: &User) -> Result<()> {
        let value = encode("user", user)?;
        let mut value = Some(value);

        self.storage
            .update(&user_key(user.id), &mut |current: Option<&[u8]>| {
                if current.is_some() {
                    return Err(GraphError::DuplicateId { id: user.id });
                }
                Ok(value.take())
            })
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the user doesn't exist.
    pub fn get(&self, id: UserId) -> Result<User> {
        match self.storage.get(&user_key(id))? {
            Some(bytes) => decode("user", &bytes),
            None => Err(GraphError::NotFound { id }),
        }
    }

    /// Fetch the subset of `ids` that exist, ascending by id, each at most once.
    ///
    /// Missing ids are skipped silently; compare the result length against the
    /// distinct input ids to detect them.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the read fails.
    pub fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let keys: Vec<Vec<u8>> = ids.iter().map(|&id| user_key(id)).collect();
        self.storage
            .multi_get(&keys)?
            .into_iter()
            .flatten()
            .map(|bytes| decode("user", &bytes))
            .collect()
    }

    /// Apply a partial change to an existing user and return the new record.
    ///
    /// Unchanged records are not rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the user doesn't exist, or the
    /// mutation's own error (see [`UserMutation::apply`]).
    pub fn update(&self, id: UserId, mutation: UserMutation) -> Result<User> {
        let mut updated = None;

        self.storage
            .update(&user_key(id), &mut |current: Option<&[u8]>| {
                let bytes = current.ok_or(GraphError::NotFound { id })?;
                let mut user: User = decode("user", bytes)?;
                let changed = mutation.apply(&mut user)?;
                let value = if changed {
                    Some(encode("user", &user)?)
                } else {
                    None
                };
                updated = Some(user);
                Ok(value)
            })?;

        trace!("Applied {mutation:?} to user {id}");
        updated.ok_or(GraphError::NotFound { id })
    }

    /// Delete a user and return the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the user doesn't exist.
    pub fn delete(&self, id: UserId) -> Result<User> {
        match self.storage.remove(&user_key(id))? {
            Some(bytes) => decode("user", &bytes),
            None => Err(GraphError::NotFound { id }),
        }
    }

    /// Remove `id` from every stored friend list. Returns how many users changed.
    ///
    /// Each affected record is rewritten with its own atomic update. Users
    /// deleted while the scan is in progress are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the scan or a write fails.
    pub fn remove_from_all_friend_lists(&self, id: UserId) -> Result<usize> {
        let mut modified = 0;

        for (_, bytes) in self.storage.scan_prefix(USER_PREFIX.as_bytes())? {
            let user: User = decode("user", &bytes)?;
            if !user.has_friend(id) {
                continue;
            }

            match self.update(user.id, UserMutation::RemoveFriend(id)) {
                Ok(_) => modified += 1,
                Err(GraphError::NotFound { .. }) => {
                    trace!("User {} vanished during scrub of {id}", user.id);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Removed user {id} from {modified} friend lists");
        Ok(modified)
    }

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the scan fails.
    pub fn count(&self) -> Result<usize> {
        Ok(self.storage.scan_prefix(USER_PREFIX.as_bytes())?.len())
    }
}
