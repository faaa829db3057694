//! Named sequence counters for id assignment.

use super::types::{decode, encode, Counter};
use crate::error::{GraphError, Result};
use crate::storage::StorageBackend;
use log::trace;
use std::sync::Arc;

const COUNTER_PREFIX: &str = "counter:";

fn counter_key(name: &str) -> Vec<u8> {
    format!("{COUNTER_PREFIX}{name}").into_bytes()
}

/// Issues strictly increasing values per sequence name.
///
/// Counters are created lazily and never deleted. Issuance is a single
/// atomic [`StorageBackend::update`], so concurrent callers never share a value.
#[derive(Clone)]
pub struct SequenceCounter {
    storage: Arc<dyn StorageBackend>,
}

impl SequenceCounter {
    /// Create a counter over the given backend.
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Issue the next value of `name`. The first value of a new sequence is 1.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the backend read or write fails.
    pub fn next(&self, name: &str) -> Result<u64> {
        let mut issued = 0;

        self.storage
            .update(&counter_key(name), &mut |current: Option<&[u8]>| {
                let counter = match current {
                    Some(bytes) => {
                        let stored: Counter = decode("counter", bytes)?;
                        let value = stored.value.checked_add(1).ok_or_else(|| {
                            GraphError::storage(
                                format!("Sequence '{name}' exhausted"),
                                None::<std::io::Error>,
                            )
                        })?;
                        Counter { value, ..stored }
                    }
                    None => Counter {
                        name: name.to_string(),
                        value: 1,
                    },
                };
                issued = counter.value;
                encode("counter", &counter).map(Some)
            })?;

        trace!("Sequence '{name}' issued {issued}");
        Ok(issued)
    }

    /// Last value issued for `name`, or `None` if the sequence was never used.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] if the read fails.
    pub fn current(&self, name: &str) -> Result<Option<u64>> {
        self.storage
            .get(&counter_key(name))?
            .map(|bytes| decode::<Counter>("counter", &bytes).map(|c| c.value))
            .transpose()
    }
}
