//! State graph: nodes + explicit edges (from → to) + conditional edges (from → router → {label: to}).
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START` and
//! `END` for graph entry/exit, attach routers with `add_conditional_edges`, then
//! `compile` or `compile_with_checkpointer` to get a `CompiledStateGraph`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AgentError;
use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{Branch, CompiledStateGraph, RouterFn, Transition, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;
use crate::graph::{GraphState, Route};
use crate::memory::Checkpointer;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// A conditional edge before validation.
struct PendingBranch<S> {
    from: String,
    router: RouterFn<S>,
    labels: Vec<&'static str>,
    path_map: HashMap<String, String>,
}

/// State graph: nodes plus explicit and conditional edges.
///
/// Generic over state type `S`. Each node has exactly one outgoing transition:
/// either a fixed edge or a router. The topology is validated once by `compile`
/// and immutable afterwards.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id).
    edges: Vec<(String, String)>,
    branches: Vec<PendingBranch<S>>,
}

impl<S> Default for StateGraph<S>
where
    S: GraphState,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: GraphState,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an unconditional edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. Both ids (except
    /// START/END) must be registered via `add_node` before `compile()`.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds a conditional edge leaving `from_id`.
    ///
    /// After `from_id` runs, `router` reads the merged state and returns a route;
    /// the next node is `path_map[route.label()]`. `compile` fails if any of
    /// `R::variants()` is missing from `path_map` or a destination is unknown.
    pub fn add_conditional_edges<R, F>(
        &mut self,
        from_id: impl Into<String>,
        router: F,
        path_map: impl IntoIterator<Item = (R, &'static str)>,
    ) -> &mut Self
    where
        R: Route,
        F: Fn(&S) -> Result<R, AgentError> + Send + Sync + 'static,
    {
        let router: RouterFn<S> = Arc::new(move |state: &S| router(state).map(|r| r.label()));
        self.branches.push(PendingBranch {
            from: from_id.into(),
            router,
            labels: R::variants().iter().map(|r| r.label()).collect(),
            path_map: path_map
                .into_iter()
                .map(|(r, to)| (r.label().to_string(), to.to_string()))
                .collect(),
        });
        self
    }

    /// Builds the executable graph after validating the topology.
    ///
    /// Returns `CompilationError` if any edge references an unknown node, START has
    /// no outgoing edge, a node has zero or several outgoing transitions, or a path
    /// map does not cover its router's labels. Validation is pure: compiling the same
    /// topology twice yields the same verdict.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer; state is saved after every
    /// step for runs whose config carries a `thread_id`.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn check_known(&self, id: &str) -> Result<(), CompilationError> {
        if id == START || id == END || self.nodes.contains_key(id) {
            Ok(())
        } else {
            Err(CompilationError::NodeNotFound(id.to_string()))
        }
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        let mut transitions: HashMap<String, Transition<S>> = HashMap::new();

        for (from, to) in &self.edges {
            self.check_known(from)?;
            self.check_known(to)?;
            if from == END {
                return Err(CompilationError::InvalidEdge(format!("edge leaves END: {} -> {}", from, to)));
            }
            if to == START {
                return Err(CompilationError::InvalidEdge(format!("edge enters START: {} -> {}", from, to)));
            }
            if transitions
                .insert(from.clone(), Transition::Direct(to.clone()))
                .is_some()
            {
                return Err(CompilationError::DuplicateEdge(from.clone()));
            }
        }

        for branch in &self.branches {
            self.check_known(&branch.from)?;
            if branch.from == END {
                return Err(CompilationError::InvalidEdge("conditional edge leaves END".into()));
            }
            for label in &branch.labels {
                if !branch.path_map.contains_key(*label) {
                    return Err(CompilationError::IncompleteRouteMap {
                        from: branch.from.clone(),
                        label: label.to_string(),
                    });
                }
            }
            for to in branch.path_map.values() {
                self.check_known(to)?;
                if to == START {
                    return Err(CompilationError::InvalidEdge(format!(
                        "conditional edge from {} enters START",
                        branch.from
                    )));
                }
            }
            let transition = Transition::Branch(Branch {
                router: Arc::clone(&branch.router),
                path_map: branch.path_map.clone(),
            });
            if transitions.insert(branch.from.clone(), transition).is_some() {
                return Err(CompilationError::DuplicateEdge(branch.from.clone()));
            }
        }

        if !transitions.contains_key(START) {
            return Err(CompilationError::MissingStart);
        }

        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();
        for id in ids {
            if !transitions.contains_key(id.as_str()) {
                return Err(CompilationError::MissingEdge(id.clone()));
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            transitions,
            checkpointer,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}
