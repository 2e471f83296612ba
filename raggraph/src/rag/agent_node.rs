//! Agent node: call the model with the conversation and the retrieval tool.
//!
//! The reply either answers directly (route → END) or requests a tool call
//! (route → retrieve).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::{LlmClient, ToolChoiceMode};
use crate::message::Message;
use crate::state::{ChatState, ChatUpdate};
use crate::tool_source::ToolSource;

use super::prompts::GRADE_TOOL_NAME;
use super::AGENT;

/// Agent node.
///
/// **Interaction**: Implements `Node<ChatState>`. Reads all messages, calls
/// `LlmClient::invoke_with_tools` with the tool source's specs, appends the reply.
pub struct AgentNode {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
}

impl AgentNode {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolSource>) -> Self {
        Self { llm, tools }
    }
}

/// History sent to the model: grading messages are dropped since no tool message
/// ever answers their tool call.
pub(crate) fn model_history(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| {
            !(m.has_tool_calls() && m.tool_calls.iter().all(|c| c.name == GRADE_TOOL_NAME))
        })
        .cloned()
        .collect()
}

#[async_trait]
impl Node<ChatState> for AgentNode {
    fn id(&self) -> &str {
        AGENT
    }

    async fn run(&self, state: &ChatState) -> Result<ChatUpdate, AgentError> {
        let tools = self
            .tools
            .list_tools()
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("list tools: {}", e)))?;
        let history = model_history(&state.messages);
        let response = self
            .llm
            .invoke_with_tools(&history, &tools, ToolChoiceMode::Auto)
            .await?;
        tracing::debug!(
            tool_calls = response.tool_calls.len(),
            "agent replied"
        );
        Ok(ChatUpdate::message(response.into_message()))
    }
}
