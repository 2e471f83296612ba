//! Graph state contract: how a node's delta merges into the accumulated state.

use std::fmt::Debug;

/// State type flowing through a graph.
///
/// Nodes read the accumulated state and return an `Update`; the runner merges it with
/// `apply` before routing. For message logs the merge is concatenation.
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    /// Delta returned by one node.
    type Update: Clone + Send + Sync + Debug + 'static;

    /// Merges one node's delta into the accumulated state.
    fn apply(&mut self, update: Self::Update);
}
