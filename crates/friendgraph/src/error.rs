//! Error types for friendgraph operations.
//!
//! All fallible operations return [`Result<T>`]. Callers that translate errors
//! into a transport format should branch on [`GraphError::kind`] rather than on
//! the display text.

use crate::graph::UserId;
use thiserror::Error;

/// Result type alias for friendgraph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error type for all store operations.
///
/// Persistence failures are never swallowed: they surface as
/// [`GraphError::StoreUnavailable`], prefixed with the logical step that failed.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Persistence I/O failure, including timeouts and cancellation.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Detailed error message, prefixed with the failed step
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One or more referenced user ids do not exist.
    #[error("Undefined indexes: {requested:?}")]
    UndefinedIndexes {
        /// Every id the caller asked about, in request order
        requested: Vec<UserId>,
        /// The ids that were not found
        missing: Vec<UserId>,
    },

    /// Insert collided with an existing record.
    #[error("Duplicate id: {id}")]
    DuplicateId {
        /// The colliding id
        id: UserId,
    },

    /// The friend edge is already recorded.
    #[error("User {source_id} is already in friend list of {target_id}")]
    FriendshipAlreadyExists {
        /// User being added as a friend
        source_id: UserId,
        /// User whose friend list already holds `source_id`
        target_id: UserId,
    },

    /// Single-record lookup miss.
    #[error("User not found: {id}")]
    NotFound {
        /// ID of the missing user
        id: UserId,
    },

    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Coarse classification of a [`GraphError`] for the calling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`GraphError::UndefinedIndexes`]
    UndefinedIndexes,
    /// See [`GraphError::DuplicateId`]
    DuplicateId,
    /// See [`GraphError::FriendshipAlreadyExists`]
    FriendshipAlreadyExists,
    /// See [`GraphError::NotFound`]
    NotFound,
    /// See [`GraphError::StoreUnavailable`]
    StoreUnavailable,
    /// See [`GraphError::Serialization`]
    Corrupt,
}

impl ErrorKind {
    /// Whether the failure was caused by the request rather than the store.
    pub fn is_caller_error(self) -> bool {
        matches!(
            self,
            ErrorKind::UndefinedIndexes
                | ErrorKind::FriendshipAlreadyExists
                | ErrorKind::NotFound
        )
    }
}

impl GraphError {
    /// Create a store-unavailable error from a message and optional source.
    pub fn storage<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreUnavailable {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Prefix a persistence failure with the logical step that produced it.
    ///
    /// Caller-facing kinds pass through untouched.
    pub fn at_step(self, step: &str) -> Self {
        match self {
            Self::StoreUnavailable { message, source } => Self::StoreUnavailable {
                message: format!("{step}: {message}"),
                source,
            },
            other => other,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Self::UndefinedIndexes { .. } => ErrorKind::UndefinedIndexes,
            Self::DuplicateId { .. } => ErrorKind::DuplicateId,
            Self::FriendshipAlreadyExists { .. } => ErrorKind::FriendshipAlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Serialization { .. } => ErrorKind::Corrupt,
        }
    }
}
