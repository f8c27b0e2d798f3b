//! Global concurrency limiting for outgoing requests
//!
//! Every request the crawler sends, listing or discussion page, first takes a
//! slot from a [`ConcurrencyLimiter`]. The limiter wraps a tokio semaphore,
//! which hands out permits in FIFO order, so a waiting request is never
//! starved once slots free up.

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Caps the number of requests in flight at the same time
///
/// Clones share the same slots, which lets several fetchers in one process
/// share a single global limit.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    /// Slots still available
    semaphore: Arc<Semaphore>,

    /// Total number of slots
    limit: usize,
}

/// A held slot; the slot is released when this is dropped
#[derive(Debug)]
pub struct RequestSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing `limit` concurrent requests
    ///
    /// A limit of zero would block every request forever and is raised to one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Total number of slots
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// Waits for a free slot
    ///
    /// Fails only if the underlying semaphore was closed, which this type
    /// never does on its own.
    pub async fn acquire(&self) -> Result<RequestSlot, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        Ok(RequestSlot { _permit: permit })
    }
}
