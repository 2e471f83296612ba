//! Graph node trait: one step in a StateGraph.
//!
//! Receives the accumulated state, returns the delta to merge. Routing is not the
//! node's concern; edges and routers attached to the graph pick the next node.

use async_trait::async_trait;

use crate::error::AgentError;

use super::GraphState;

/// One step in a graph: accumulated state in, delta out.
///
/// **Interaction**: Registered with `StateGraph::add_node`; run by
/// `CompiledStateGraph` which applies the returned delta and then resolves the
/// node's outgoing edge against the merged state.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: GraphState,
{
    /// Node id (e.g. `"agent"`, `"retrieve"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// Runs the step. Model and tool calls happen here; the runner awaits the
    /// returned future before routing or emitting the step's stream event.
    async fn run(&self, state: &S) -> Result<S::Update, AgentError>;
}
