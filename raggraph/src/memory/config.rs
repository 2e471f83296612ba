//! Invoke config: thread_id, checkpoint_id, checkpoint_ns.
//!
//! Used by CompiledStateGraph::invoke / stream and by Checkpointer.

/// Config for a single run. Identifies the thread and optional checkpoint.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke(state, config)` and
/// `Checkpointer::put` / `get_tuple` / `list`.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Unique id for this conversation/thread. Required when using a checkpointer.
    pub thread_id: Option<String>,
    /// If set, `get_tuple` loads this checkpoint instead of the latest.
    pub checkpoint_id: Option<String>,
    /// Optional namespace for checkpoints. Default is empty.
    pub checkpoint_ns: String,
}

impl RunnableConfig {
    /// Config for the latest checkpoint of `thread_id` in the default namespace.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }
}
