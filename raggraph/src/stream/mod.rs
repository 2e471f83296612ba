//! Streaming types for graph runs.
//!
//! Defines stream modes and events emitted by `CompiledStateGraph::stream`. One
//! event (per enabled mode) is produced after each node's delta has been merged
//! and checkpointed.

use crate::error::AgentError;
use crate::graph::GraphState;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each node completes.
    Values,
    /// Emit the node id and the delta it produced.
    Updates,
}

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: GraphState,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Delta produced by one node visit.
    Updates { node_id: String, update: S::Update },
    /// The run failed; always the last event of the stream.
    Error(AgentError),
}
