//! Checkpoint and metadata types.
//!
//! A checkpoint is one state snapshot of a thread: id, timestamp, the state itself
//! and metadata telling which step of which run produced it.

use std::time::SystemTime;

/// Metadata for a single checkpoint (source, step, created_at).
///
/// Used by Checkpointer implementations and by `list()` for thread history.
#[derive(Debug, Clone)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Node visits completed in the run when this checkpoint was taken (0 = run input).
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// Source of the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Run input: the loaded thread state plus the new message, before any node ran.
    Input,
    /// Written by the run loop after a node's delta was merged.
    Loop,
}

/// One checkpoint: state snapshot + id/ts + metadata.
///
/// **Interaction**: Produced by graph execution; consumed by `Checkpointer::put`,
/// returned by `get_tuple`.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub channel_values: S,
    pub metadata: CheckpointMetadata,
}

/// Item returned by `Checkpointer::list` for thread history.
#[derive(Debug, Clone)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint from current state. Uses current time and a random suffix for the id.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        let id = format!("{}-{}-{}", ts, step, uuid::Uuid::new_v4().simple());
        Self {
            id,
            ts,
            channel_values: state,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }
}
