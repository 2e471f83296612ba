//! LLM client abstraction used by the graph nodes.
//!
//! Agent and GradeDocuments call the model with tools; Rewrite and Generate call it
//! with messages only. The model is an opaque capability: messages (and optionally
//! tools) in, assistant text plus optional tool calls out.

mod mock;

#[cfg(feature = "openai")]
mod openai;

pub use mock::{MockLlm, RecordedCall};

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

/// Tool choice mode for chat completions: when tools are present, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model can pick between message or tool calls. Default when tools are present.
    #[default]
    Auto,
    /// Model will not call any tool.
    None,
    /// Model must call one or more tools.
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Response from an LLM completion: assistant message text and optional tool calls.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; nodes turn it into an ai
/// [`Message`] via [`LlmResponse::into_message`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls from this turn; empty means the model answered directly.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Plain text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Answer that requests the given tool calls.
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
        }
    }

    pub fn into_message(self) -> Message {
        Message::ai(self.content).with_tool_calls(self.tool_calls)
    }
}

/// LLM client: given messages (and optional tools), returns assistant text and tool calls.
///
/// Implementations: `MockLlm` (scripted), `ChatOpenAI` (real API, feature `openai`).
///
/// **Interaction**: Shared as `Arc<dyn LlmClient>` by all model-calling nodes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion with the given tools available.
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
        tool_choice: ToolChoiceMode,
    ) -> Result<LlmResponse, AgentError>;

    /// One completion without tools.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.invoke_with_tools(messages, &[], ToolChoiceMode::None)
            .await
    }
}
