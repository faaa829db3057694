//! Per-operation context: deadline and cancellation.
//!
//! Every [`GraphStore`](crate::GraphStore) operation takes an [`OpContext`].
//! The context is checked before each persistence step, so an expired or
//! cancelled operation stops between steps and never half-applies a step.

use crate::error::{GraphError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline and cancellation flag carried through one store operation.
#[derive(Debug, Clone)]
pub struct OpContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

/// Handle that cancels an [`OpContext`] from another thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl OpContext {
    /// A context with no deadline. It can still be cancelled.
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_timeout(Some(timeout))
    }

    /// A context with an optional timeout; `None` means no deadline.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        Self {
            deadline: timeout.map(|t| Instant::now() + t),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The instant after which steps are refused, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Get a handle that cancels this context.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Whether [`CancelHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Gate the next persistence step.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StoreUnavailable`] naming `step` when the context
    /// is cancelled or past its deadline.
    pub fn check(&self, step: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(GraphError::storage(
                format!("{step}: operation cancelled"),
                None::<std::io::Error>,
            ));
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(GraphError::storage(
                    format!("{step}: deadline exceeded"),
                    None::<std::io::Error>,
                ));
            }
        }

        Ok(())
    }
}

impl Default for OpContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CancelHandle {
    /// Cancel the associated context. Steps already running finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
