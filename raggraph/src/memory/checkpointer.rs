//! Checkpointer trait: save and load per-thread state snapshots.

use async_trait::async_trait;
use thiserror::Error;

use super::{Checkpoint, CheckpointListItem, CheckpointMetadata, RunnableConfig};

/// Error from a checkpointer operation.
#[derive(Debug, Clone, Error)]
pub enum CheckpointError {
    /// The config has no thread_id.
    #[error("thread_id is required")]
    ThreadIdRequired,
    /// Backend failure (lock poisoned, storage unavailable, ...).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Saves and loads checkpoints keyed by `(thread_id, checkpoint_ns)`.
///
/// **Interaction**: Held by `CompiledStateGraph` (writes after each step) and by
/// `RagRunner` (reads the latest state before a run).
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Stores a checkpoint for `config.thread_id`; returns its id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Latest checkpoint for the thread, or the one named by `config.checkpoint_id`.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError>;

    /// Checkpoints of the thread, newest first, at most `limit` when given.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}
