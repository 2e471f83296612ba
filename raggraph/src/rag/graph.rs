//! Topology of the retrieval graph.

use std::sync::Arc;

use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, END, START};
use crate::llm::LlmClient;
use crate::memory::Checkpointer;
use crate::state::ChatState;
use crate::tool_source::ToolSource;

use super::routing::{check_relevance, should_retrieve, Relevance, RetrieveRoute};
use super::{
    AgentNode, GenerateNode, GradeDocumentsNode, RetrieveNode, RewriteNode, AGENT, GENERATE,
    GRADE_DOCUMENTS, RETRIEVE, REWRITE,
};

/// Builds and validates the five-node graph.
///
/// All model-calling nodes share `llm`; Agent lists and Retrieve calls `tools`.
/// With a checkpointer, every step of runs carrying a thread id is persisted.
pub fn build_rag_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    checkpointer: Option<Arc<dyn Checkpointer<ChatState>>>,
) -> Result<CompiledStateGraph<ChatState>, CompilationError> {
    let mut graph = StateGraph::<ChatState>::new();
    graph
        .add_node(AGENT, Arc::new(AgentNode::new(llm.clone(), tools.clone())))
        .add_node(RETRIEVE, Arc::new(RetrieveNode::new(tools)))
        .add_node(GRADE_DOCUMENTS, Arc::new(GradeDocumentsNode::new(llm.clone())))
        .add_node(REWRITE, Arc::new(RewriteNode::new(llm.clone())))
        .add_node(GENERATE, Arc::new(GenerateNode::new(llm)))
        .add_edge(START, AGENT)
        .add_conditional_edges(
            AGENT,
            should_retrieve,
            [(RetrieveRoute::Retrieve, RETRIEVE), (RetrieveRoute::End, END)],
        )
        .add_edge(RETRIEVE, GRADE_DOCUMENTS)
        .add_conditional_edges(
            GRADE_DOCUMENTS,
            check_relevance,
            [(Relevance::Yes, GENERATE), (Relevance::No, REWRITE)],
        )
        .add_edge(REWRITE, AGENT)
        .add_edge(GENERATE, END);

    match checkpointer {
        Some(cp) => graph.compile_with_checkpointer(cp),
        None => graph.compile(),
    }
}
