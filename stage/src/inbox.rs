//! Latest-wins message handoff between adjacent stages.
//!
//! Each stage owns exactly one inbox and never locks another stage's, so
//! lock ordering is trivial. All acquisitions are bounded-wait: a producer
//! that cannot get the slot in time reports failure and moves on — under
//! load the consumer simply skips frames, which is the intended
//! backpressure.

use parking_lot::Mutex;
use std::time::Duration;

/// Default bounded wait for inbox lock acquisition, in microseconds.
pub const DEFAULT_TIMEOUT_US: u64 = 1000;

/// Push contract between adjacent stages.
///
/// Returns `false`, with no side effects, when the receiver's inbox cannot
/// be locked within its timeout; the caller drops that frame's delivery.
pub trait Listener<T>: Send + Sync {
    fn add_message(&self, data: T) -> bool;
}

/// A single-slot mailbox.
///
/// `post` replaces whatever is in the slot — latest wins, nothing queues.
pub struct Inbox<T> {
    slot: Mutex<Vec<T>>,
    timeout: Duration,
}

impl<T> Inbox<T> {
    pub fn new() -> Self {
        Self::with_timeout_us(DEFAULT_TIMEOUT_US)
    }

    pub fn with_timeout_us(usec: u64) -> Self {
        Self {
            slot: Mutex::new(Vec::new()),
            timeout: Duration::from_micros(usec),
        }
    }

    /// Replace the slot contents. Returns `false` on lock contention.
    pub fn post(&self, items: Vec<T>) -> bool {
        let Some(mut slot) = self.slot.try_lock_for(self.timeout) else {
            tracing::debug!("inbox lock busy, frame dropped");
            return false;
        };
        *slot = items;
        true
    }

    /// Drain the slot. Returns `None` on lock contention; an empty vector
    /// means nothing was posted since the last take.
    pub fn take(&self) -> Option<Vec<T>> {
        let mut slot = self.slot.try_lock_for(self.timeout)?;
        Some(std::mem::take(&mut *slot))
    }
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync> Listener<Vec<T>> for Inbox<T> {
    fn add_message(&self, data: Vec<T>) -> bool {
        self.post(data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
