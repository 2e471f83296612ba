//! Conversation messages.
//!
//! One `Message` per turn: human input, model output (optionally with tool calls),
//! or a tool result that answers a specific tool call. Messages are never mutated
//! after they are appended to a [`ChatState`](crate::state::ChatState).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a message.
///
/// Serialized lowercase (`"human"`, `"ai"`, `"tool"`, `"system"`); the same string is
/// used as the `type` field of streamed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions sent to the model. Graph nodes build these per call and do not persist them.
    System,
    Human,
    Ai,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "human",
            Role::Ai => "ai",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id; the answering tool message carries it as `tool_call_id`.
    pub id: String,
    /// Tool name as listed by the tool source.
    pub name: String,
    /// Arguments as a JSON object.
    pub args: Value,
}

/// One message of a conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }

    /// Tool result answering the call with id `tool_call_id`.
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    /// Builder: attach tool calls (only meaningful on ai messages).
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
