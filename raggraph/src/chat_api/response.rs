//! Buffered JSON response bodies.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::state::ChatState;

use super::parse::ParsedChatRequest;

/// Generic message for failed runs; details go to the log only.
pub const PROCESSING_ERROR: &str = "An error occurred while processing your message";

/// Buffered answer: `{ response, threadId, annotation }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub annotation: String,
}

impl ChatResponse {
    /// Content of the final state's last message is the answer.
    pub fn from_state(state: &ChatState, parsed: &ParsedChatRequest) -> Self {
        Self {
            response: state
                .last_message()
                .map(|m| m.content.clone())
                .unwrap_or_default(),
            thread_id: parsed.thread_id.clone(),
            annotation: parsed.annotation.clone(),
        }
    }
}

/// `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Persisted thread: `{ threadId, messages }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadStateResponse {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub messages: Vec<Message>,
}
