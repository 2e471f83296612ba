//! Graph run error types.
//!
//! Returned by `Node::run` and by `CompiledStateGraph::invoke` / `stream` when a
//! step fails, a router picks an unmapped label, or the run exceeds its step budget.

use thiserror::Error;

use crate::memory::CheckpointError;

/// Error raised while running a graph.
///
/// Node failures (model or tool calls) are not retried by the engine; they propagate
/// to the caller. Checkpoints written for steps that completed before the failure stay.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, tool error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A conditional edge router returned a label that its path map does not contain.
    #[error("router from '{from}' returned unmapped label '{label}'")]
    UnknownRoute { from: String, label: String },

    /// The grading step produced a verdict other than `yes` / `no`.
    #[error("invalid relevance verdict: {0}")]
    InvalidVerdict(String),

    /// The run visited more nodes than the configured recursion limit.
    #[error("routing exhausted: recursion limit of {0} steps reached")]
    RecursionLimit(usize),

    /// Saving or loading a checkpoint failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// The stream consumer went away; the run stopped after its current step.
    #[error("run cancelled: stream consumer disconnected")]
    Cancelled,
}
