//! Rewrite node: reformulate the question after irrelevant retrieval.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{ChatState, ChatUpdate};

use super::prompts::render_rewrite_prompt;
use super::REWRITE;

/// Rewrite node: emits the improved question as a new human message, which the
/// Agent then treats as the current question.
pub struct RewriteNode {
    llm: Arc<dyn LlmClient>,
}

impl RewriteNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ChatState> for RewriteNode {
    fn id(&self) -> &str {
        REWRITE
    }

    async fn run(&self, state: &ChatState) -> Result<ChatUpdate, AgentError> {
        let question = state
            .current_question()
            .map(|m| m.content.as_str())
            .ok_or_else(|| AgentError::ExecutionFailed("rewrite: no question in state".into()))?;
        let response = self
            .llm
            .invoke(&[Message::human(render_rewrite_prompt(question))])
            .await?;
        let rewritten = response.content.trim();
        if rewritten.is_empty() {
            return Err(AgentError::ExecutionFailed(
                "rewrite: model returned an empty question".into(),
            ));
        }
        tracing::debug!(rewritten = %rewritten, "question rewritten");
        Ok(ChatUpdate::message(Message::human(rewritten)))
    }
}
