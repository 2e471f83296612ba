//! State graph: nodes, unconditional and conditional edges, compile and run.
//!
//! Add nodes and edges (use `START` / `END` for entry and exit), attach routers with
//! `add_conditional_edges`, then compile to a `CompiledStateGraph` that runs buffered
//! (`invoke`) or streaming (`stream`), checkpointing after every step.

mod compile_error;
mod compiled;
mod graph_state;
pub mod logging;
mod node;
mod route;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
pub use graph_state::GraphState;
pub use node::Node;
pub use route::Route;
pub use run_context::RunContext;
pub use state_graph::{StateGraph, END, START};
