//! Inbound chat request types.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Required; validated by `parse_chat_request`, not by deserialization.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "threadId")]
    pub thread_id: Option<String>,
}

/// Query string of `POST /chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatQuery {
    #[serde(default, rename = "useStream")]
    pub use_stream: Option<String>,
}

impl ChatQuery {
    /// Streaming is on when `useStream` is present and not empty, `false` or `0`.
    pub fn wants_stream(&self) -> bool {
        match self.use_stream.as_deref().map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(v) => !v.eq_ignore_ascii_case("false"),
        }
    }
}
