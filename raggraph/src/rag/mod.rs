//! Agentic retrieval graph.
//!
//! ```text
//! START → agent ─(tool call)→ retrieve → grade_documents ─(yes)→ generate → END
//!           │                                   └──(no)→ rewrite → agent
//!           └─(direct answer)→ END
//! ```
//!
//! [`build_rag_graph`] wires the nodes; [`RagRunner`] adds per-thread state loading,
//! locking and the two consumption modes.

mod agent_node;
mod generate_node;
mod grade_node;
mod graph;
pub mod prompts;
mod retrieve_node;
mod rewrite_node;
pub mod routing;
mod runner;

pub use agent_node::AgentNode;
pub use generate_node::GenerateNode;
pub use grade_node::GradeDocumentsNode;
pub use graph::build_rag_graph;
pub use retrieve_node::RetrieveNode;
pub use rewrite_node::RewriteNode;
pub use routing::{check_relevance, should_retrieve, Relevance, RetrieveRoute};
pub use runner::{build_rag_initial_state, RagRunner, RunError};

use crate::error::AgentError;
use crate::state::ChatState;

pub const AGENT: &str = "agent";
pub const RETRIEVE: &str = "retrieve";
pub const GRADE_DOCUMENTS: &str = "grade_documents";
pub const REWRITE: &str = "rewrite";
pub const GENERATE: &str = "generate";

/// Separator between the results of parallel retrieval calls.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Current question and the content of every tool result answering the latest
/// retrieval request, or an error naming `node`.
pub(crate) fn question_and_context<'a>(
    state: &'a ChatState,
    node: &str,
) -> Result<(&'a str, String), AgentError> {
    let question = state
        .current_question()
        .ok_or_else(|| AgentError::ExecutionFailed(format!("{}: no question in state", node)))?;
    let results = state.latest_tool_results();
    if results.is_empty() {
        return Err(AgentError::ExecutionFailed(format!("{}: no retrieved documents", node)));
    }
    let context = results
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);
    Ok((question.content.as_str(), context))
}
