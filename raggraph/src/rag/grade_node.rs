//! GradeDocuments node: ask the model whether the retrieved documents answer the question.
//!
//! The model is forced to call the grading tool; the node appends an ai message
//! carrying that call so `check_relevance` can read the verdict.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::{LlmClient, ToolChoiceMode};
use crate::message::Message;
use crate::state::{ChatState, ChatUpdate};

use super::prompts::{grade_tool_spec, render_grade_prompt, GRADE_TOOL_NAME};
use super::{question_and_context, GRADE_DOCUMENTS};

/// GradeDocuments node.
///
/// **Interaction**: Implements `Node<ChatState>`; reads the current question and the
/// latest tool result, calls the model with the grading tool required.
pub struct GradeDocumentsNode {
    llm: Arc<dyn LlmClient>,
}

impl GradeDocumentsNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

/// Lowercases and trims a string `binary_score` so "Yes " reads as "yes".
fn normalize_score(args: &mut Value) {
    if let Some(score) = args.get_mut("binary_score") {
        if let Some(s) = score.as_str() {
            *score = Value::String(s.trim().to_ascii_lowercase());
        }
    }
}

#[async_trait]
impl Node<ChatState> for GradeDocumentsNode {
    fn id(&self) -> &str {
        GRADE_DOCUMENTS
    }

    async fn run(&self, state: &ChatState) -> Result<ChatUpdate, AgentError> {
        let (question, context) = question_and_context(state, GRADE_DOCUMENTS)?;
        let prompt = render_grade_prompt(question, &context);
        let response = self
            .llm
            .invoke_with_tools(
                &[Message::human(prompt)],
                &[grade_tool_spec()],
                ToolChoiceMode::Required,
            )
            .await?;

        let mut message: Message = response.into_message();
        for call in message.tool_calls.iter_mut().filter(|c| c.name == GRADE_TOOL_NAME) {
            normalize_score(&mut call.args);
        }
        tracing::debug!(
            verdict = ?message.tool_calls.first().map(|c| c.args.clone()),
            "documents graded"
        );
        Ok(ChatUpdate::message(message))
    }
}
