//! Generate node: produce the final answer from the question and the retrieved context.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::state::{ChatState, ChatUpdate};

use super::prompts::render_generate_prompt;
use super::{question_and_context, GENERATE};

/// Generate node. Its ai message is the answer surfaced to the caller.
pub struct GenerateNode {
    llm: Arc<dyn LlmClient>,
}

impl GenerateNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ChatState> for GenerateNode {
    fn id(&self) -> &str {
        GENERATE
    }

    async fn run(&self, state: &ChatState) -> Result<ChatUpdate, AgentError> {
        let (question, context) = question_and_context(state, GENERATE)?;
        let response = self
            .llm
            .invoke(&[Message::human(render_generate_prompt(question, &context))])
            .await?;
        Ok(ChatUpdate::message(Message::ai(response.content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};

    /// **Scenario**: Generate answers from the latest question and tool result.
    #[tokio::test]
    async fn generate_uses_question_and_context() {
        let llm = Arc::new(MockLlm::new([LlmResponse::text("Kickoff first.")]));
        let node = GenerateNode::new(llm.clone());
        let state = ChatState {
            messages: vec![
                Message::human("old question"),
                Message::tool("old docs", "c0"),
                Message::human("new question"),
                Message::tool("new docs", "c1"),
            ],
        };
        let update = node.run(&state).await.unwrap();
        assert_eq!(update.messages, vec![Message::ai("Kickoff first.")]);
        let prompt = &llm.calls()[0].messages[0].content;
        assert!(prompt.contains("new question") && prompt.contains("new docs"));
        assert!(!prompt.contains("old docs"));
    }
}
