//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the topology is malformed. A graph that
//! fails to compile is never served.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A node id in an edge or path map was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge leaves START.
    #[error("graph must have an edge from START")]
    MissingStart,

    /// Edge leaves END or enters START.
    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    /// More than one outgoing transition registered for the same node.
    #[error("node '{0}' has more than one outgoing edge")]
    DuplicateEdge(String),

    /// A registered node has no outgoing transition.
    #[error("node '{0}' has no outgoing edge")]
    MissingEdge(String),

    /// A conditional edge's path map does not cover one of the router's labels.
    #[error("conditional edge from '{from}' does not map label '{label}'")]
    IncompleteRouteMap { from: String, label: String },
}
