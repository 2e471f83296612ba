//! Logging utilities for graph execution.
//!
//! Structured `tracing` events for run start/end, node steps and failures.

/// Log graph execution start.
pub fn log_graph_start(thread_id: Option<&str>) {
    tracing::info!(thread_id = thread_id.unwrap_or("-"), "Starting graph execution");
}

/// Log node execution start.
///
/// `step` is the 1-based index of the node visit within the run.
pub fn log_node_start(node_id: &str, step: u64) {
    tracing::debug!(node_id = node_id, step = step, "Starting node execution");
}

/// Log node execution completion (delta merged and checkpoint written).
pub fn log_node_complete(node_id: &str, step: u64) {
    tracing::debug!(node_id = node_id, step = step, "Node execution complete");
}

/// Log a routing decision.
pub fn log_route(from: &str, to: &str) {
    tracing::trace!(from = from, to = to, "Route resolved");
}

/// Log graph execution completion.
pub fn log_graph_complete(steps: u64) {
    tracing::info!(steps = steps, "Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &crate::error::AgentError) {
    tracing::error!(%error, "Graph execution error");
}
