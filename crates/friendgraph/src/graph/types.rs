//! Core record types: users, counters, IDs, and partial updates.

use crate::error::{GraphError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Unique identifier for a user (issued by the `user_id` sequence, starts at 1).
pub type UserId = u64;

/// A user and the ids recorded in their friend list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (assigned by the store)
    pub id: UserId,
    /// Display name, set at creation
    pub name: String,
    /// Age in years
    pub age: i64,
    /// Friend ids in insertion order
    pub friends: Vec<UserId>,
}

impl User {
    /// Create a user with an empty friend list (ID will be assigned by the store).
    pub fn new(id: UserId, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            friends: Vec::new(),
        }
    }

    /// Whether `id` appears in this user's friend list.
    pub fn has_friend(&self, id: UserId) -> bool {
        self.friends.contains(&id)
    }
}

/// A named, monotonically increasing sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Sequence name, e.g. `"user_id"`
    pub name: String,
    /// Last issued value
    pub value: u64,
}

/// Partial change applied to a stored [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMutation {
    /// Replace the age
    SetAge(i64),
    /// Append a friend id. Rejected with
    /// [`GraphError::FriendshipAlreadyExists`] if the id is already listed.
    AppendFriend(UserId),
    /// Remove every occurrence of a friend id
    RemoveFriend(UserId),
}

impl UserMutation {
    /// Apply the change in place. Returns whether the record changed.
    ///
    /// # Errors
    ///
    /// [`UserMutation::AppendFriend`] fails when the edge already exists.
    pub fn apply(self, user: &mut User) -> Result<bool> {
        match self {
            UserMutation::SetAge(age) => {
                let changed = user.age != age;
                user.age = age;
                Ok(changed)
            }
            UserMutation::AppendFriend(friend_id) => {
                if user.has_friend(friend_id) {
                    return Err(GraphError::FriendshipAlreadyExists {
                        source_id: friend_id,
                        target_id: user.id,
                    });
                }
                user.friends.push(friend_id);
                Ok(true)
            }
            UserMutation::RemoveFriend(friend_id) => {
                let before = user.friends.len();
                user.friends.retain(|&id| id != friend_id);
                Ok(user.friends.len() != before)
            }
        }
    }
}

pub(crate) fn encode<T: Serialize>(what: &str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| GraphError::serialization(format!("Failed to serialize {what}"), Some(e)))
}

pub(crate) fn decode<T: DeserializeOwned>(what: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| GraphError::serialization(format!("Failed to deserialize {what}"), Some(e)))
}
