//! Retrieve node: execute the tool calls requested by the agent.
//!
//! One tool message per call, each linked to its call by `tool_call_id`. Tool
//! failures are not caught; they abort the run.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::message::{Message, Role};
use crate::state::{ChatState, ChatUpdate};
use crate::tool_source::ToolSource;

use super::RETRIEVE;

/// Truncates a string for logging, appending "..." if longer than max_len.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Retrieve node.
///
/// **Interaction**: Implements `Node<ChatState>`; reads the tool calls of the latest
/// ai message and calls `ToolSource::call_tool` for each, in order.
pub struct RetrieveNode {
    tools: Arc<dyn ToolSource>,
}

impl RetrieveNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Node<ChatState> for RetrieveNode {
    fn id(&self) -> &str {
        RETRIEVE
    }

    async fn run(&self, state: &ChatState) -> Result<ChatUpdate, AgentError> {
        let calls = match state.last_message() {
            Some(m) if m.role == Role::Ai && m.has_tool_calls() => &m.tool_calls,
            _ => {
                return Err(AgentError::ExecutionFailed(
                    "retrieve: latest message has no tool calls".into(),
                ))
            }
        };

        let mut messages = Vec::with_capacity(calls.len());
        for call in calls {
            tracing::debug!(tool = %call.name, args = %call.args, "calling tool");
            let result = self
                .tools
                .call_tool(&call.name, call.args.clone())
                .await
                .map_err(|e| {
                    AgentError::ExecutionFailed(format!("tool '{}' failed: {}", call.name, e))
                })?;
            tracing::trace!(tool = %call.name, result = %truncate_for_log(&result.text, 200), "tool result");
            messages.push(Message::tool(result.text, call.id.clone()));
        }
        Ok(ChatUpdate { messages })
    }
}
