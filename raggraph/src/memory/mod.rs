//! # Memory: per-thread checkpoints
//!
//! The graph writes a [`Checkpoint`] for a thread on entry and after every node
//! (see [`CompiledStateGraph`](crate::graph::CompiledStateGraph)). A later run on the
//! same thread starts from the latest checkpoint, which is how conversations
//! continue across requests.
//!
//! ## Config
//!
//! [`RunnableConfig`] is passed to `invoke` / `stream`:
//! - `thread_id`: Required for persistence. Identifies the conversation.
//! - `checkpoint_id`: Optional. Load a specific checkpoint instead of the latest.
//! - `checkpoint_ns`: Optional namespace.
//!
//! ## Implementations
//!
//! | Type            | Persistence | Use case                       |
//! |-----------------|-------------|--------------------------------|
//! | [`MemorySaver`] | In-memory   | Server process lifetime, tests |
//!
//! [`ThreadLocks`] serializes runs that share a thread id so that "load → run →
//! save" sequences never interleave.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod thread_locks;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::{MemorySaver, DEFAULT_HISTORY_LIMIT};
pub use thread_locks::ThreadLocks;
