//! Per-sender serialization of submissions
//!
//! The nonce is read from the node and used a moment later. Two submissions
//! for the same sender inside one process would read the same count, so the
//! window from nonce read to broadcast is held under a per-address lock.
//! Separate processes sharing a key are not coordinated.

use dashmap::DashMap;
use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Async locks keyed by sender address
#[derive(Default)]
pub struct SenderLocks {
    locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other submission for `sender` is in flight
    pub async fn acquire(&self, sender: Address) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(sender)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;
        debug!("Acquired submission lock for {:?}", sender);
        guard
    }

    /// Number of senders seen so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
