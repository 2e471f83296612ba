//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Uses the OpenAI Chat Completions API or any compatible endpoint. Requires
//! `OPENAI_API_KEY` (or explicit config). Tools passed per call are sent as
//! function tools; tool calls in the response come back as [`ToolCall`]s with
//! parsed JSON arguments.
//!
//! **Interaction**: Implements `LlmClient`; used by every model-calling node.
//! Depends on `async_openai` (feature `openai`).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, Role, ToolCall};
use crate::tool_source::ToolSpec;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
        ToolChoiceOptions,
    },
    Client,
};

use super::ToolChoiceMode;

/// OpenAI Chat Completions client implementing `LlmClient`.
///
/// Uses `OPENAI_API_KEY` from the environment by default; or provide config via
/// `ChatOpenAI::with_config` (custom key or base URL).
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert our `Message` list to OpenAI request messages, tool calls and tool results included.
    fn messages_to_request(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        messages
            .iter()
            .map(|m| {
                let converted = match m.role {
                    Role::System => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage::from(m.content.as_str()),
                    ),
                    Role::Human => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage::from(m.content.as_str()),
                    ),
                    Role::Ai if m.has_tool_calls() => {
                        let calls: Vec<ChatCompletionMessageToolCalls> = m
                            .tool_calls
                            .iter()
                            .map(|tc| {
                                ChatCompletionMessageToolCalls::Function(
                                    ChatCompletionMessageToolCall {
                                        id: tc.id.clone(),
                                        function: FunctionCall {
                                            name: tc.name.clone(),
                                            arguments: tc.args.to_string(),
                                        },
                                    },
                                )
                            })
                            .collect();
                        let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                        if !m.content.is_empty() {
                            builder.content(m.content.as_str());
                        }
                        builder.tool_calls(calls);
                        ChatCompletionRequestMessage::Assistant(builder.build().map_err(build_err)?)
                    }
                    Role::Ai => ChatCompletionRequestMessage::Assistant(m.content.as_str().into()),
                    Role::Tool => ChatCompletionRequestMessage::Tool(
                        ChatCompletionRequestToolMessageArgs::default()
                            .content(m.content.as_str())
                            .tool_call_id(m.tool_call_id.clone().unwrap_or_default())
                            .build()
                            .map_err(build_err)?,
                    ),
                };
                Ok(converted)
            })
            .collect()
    }
}

fn build_err(e: impl std::fmt::Display) -> AgentError {
    AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e))
}

/// Tool arguments arrive as a JSON string; keep the raw text when it does not parse.
fn parse_arguments(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
        tool_choice: ToolChoiceMode,
    ) -> Result<LlmResponse, AgentError> {
        let openai_messages = Self::messages_to_request(messages)?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(openai_messages);

        if !tools.is_empty() {
            let chat_tools: Vec<ChatCompletionTools> = tools
                .iter()
                .map(|t| {
                    ChatCompletionTools::Function(ChatCompletionTool {
                        function: FunctionObject {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: Some(t.input_schema.clone()),
                            ..Default::default()
                        },
                    })
                })
                .collect();
            args.tools(chat_tools);

            let opt = match tool_choice {
                ToolChoiceMode::Auto => ToolChoiceOptions::Auto,
                ToolChoiceMode::None => ToolChoiceOptions::None,
                ToolChoiceMode::Required => ToolChoiceOptions::Required,
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(opt));
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        let request = args.build().map_err(build_err)?;

        tracing::debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "chat completion");
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))?;

        let choice =
            response.choices.into_iter().next().ok_or_else(|| {
                AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
            })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| {
                if let ChatCompletionMessageToolCalls::Function(f) = tc {
                    Some(ToolCall {
                        id: f.id,
                        name: f.function.name,
                        args: parse_arguments(f.function.arguments),
                    })
                } else {
                    None
                }
            })
            .collect();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}
