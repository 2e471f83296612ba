//! Per-thread mutual exclusion for graph runs.
//!
//! Two requests on the same thread id must not interleave "load checkpoint → run →
//! save". Each thread id gets its own async mutex; runs on different threads never
//! wait for each other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-thread async mutexes.
///
/// Entries are created on first use and kept for the process lifetime, like the
/// checkpoints they guard.
#[derive(Default)]
pub struct ThreadLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `thread_id`. The guard is owned so it can move
    /// into a spawned streaming task and be released when the run ends.
    pub async fn acquire(&self, thread_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(thread_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
