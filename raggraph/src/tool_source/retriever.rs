//! Retriever exposed as a single tool.
//!
//! The tool takes `{ "query": string }` and answers with the retrieved documents'
//! content joined by blank lines, best match first.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::retrieval::Retriever;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Tool name used when none is configured.
pub const DEFAULT_RETRIEVER_NAME: &str = "retriever";

/// Tool description used when none is configured.
pub const DEFAULT_RETRIEVER_DESCRIPTION: &str =
    "Search and return information from the indexed documents.";

/// One-tool source wrapping a [`Retriever`].
pub struct RetrieverToolSource {
    retriever: Arc<dyn Retriever>,
    name: String,
    description: String,
}

impl RetrieverToolSource {
    /// Empty `name` / `description` fall back to the defaults.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        Self {
            retriever,
            name: if name.trim().is_empty() {
                DEFAULT_RETRIEVER_NAME.to_string()
            } else {
                name
            },
            description: if description.trim().is_empty() {
                DEFAULT_RETRIEVER_DESCRIPTION.to_string()
            } else {
                description
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "query to look up in retriever" }
                },
                "required": ["query"]
            }),
        }
    }

    /// `{"query": "..."}`, or a bare JSON string as the query itself.
    fn query_from(arguments: &Value) -> Result<&str, ToolSourceError> {
        match arguments {
            Value::String(s) => Ok(s.as_str()),
            other => other
                .get("query")
                .and_then(Value::as_str)
                .ok_or_else(|| ToolSourceError::InvalidInput("missing string argument 'query'".into())),
        }
    }
}

#[async_trait]
impl ToolSource for RetrieverToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![self.spec()])
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        if name != self.name {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let query = Self::query_from(&arguments)?;
        let documents = self
            .retriever
            .retrieve(query)
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        let text = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ToolCallContent { text })
    }
}
