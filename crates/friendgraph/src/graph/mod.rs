//! Core store types and operations.
//!
//! This module defines the building blocks, leaves first:
//! - [`SequenceCounter`]: Named monotonic id sequences
//! - [`UserRecordStore`]: User documents keyed by id
//! - [`GraphStore`]: The main interface composing the two

mod counter;
mod records;
mod store;
mod types;

pub use counter::SequenceCounter;
pub use records::UserRecordStore;
pub use store::{GraphStore, USER_ID_SEQUENCE};
pub use types::{Counter, User, UserId, UserMutation};
