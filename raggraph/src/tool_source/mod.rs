//! Tool sources: named capabilities the model may request.
//!
//! The graph's Agent node advertises `list_tools()` to the model; the Retrieve node
//! executes the model's tool calls through `call_tool`.

mod mock;
mod retriever;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use mock::MockToolSource;
pub use retriever::{RetrieverToolSource, DEFAULT_RETRIEVER_DESCRIPTION, DEFAULT_RETRIEVER_NAME};

/// Tool description handed to the model: name, optional description, JSON schema of arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Result of one tool call, as text for a tool message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Error from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// A set of callable tools.
///
/// **Interaction**: Held as `Arc<dyn ToolSource>` by the Agent node (for specs) and
/// the Retrieve node (for calls).
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Executes tool `name` with JSON `arguments`.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError>;
}
