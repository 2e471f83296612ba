//! Typed labels for conditional edges.

use std::fmt::Debug;

/// Closed set of labels a router can return.
///
/// Implemented by small enums (one per conditional edge). `StateGraph::compile`
/// rejects a path map that leaves any of `variants()` unmapped.
pub trait Route: Copy + Send + Sync + Debug + 'static {
    /// Every value the router may return.
    fn variants() -> &'static [Self];

    /// Label used as the path map key.
    fn label(&self) -> &'static str;
}
