//! Mock ToolSource for tests.
//!
//! Returns a fixed tool list and a fixed call result, and records every call.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock tool source: fixed tool list and fixed call result.
///
/// `list_tools()` returns a configurable list; `call_tool(name, _)` returns the
/// configured text for any listed tool and `NotFound` for others.
///
/// **Interaction**: Implements `ToolSource`; used by Retrieve node and graph tests.
pub struct MockToolSource {
    /// Tools returned by list_tools().
    tools: Vec<ToolSpec>,
    /// Text returned by call_tool for any listed name.
    call_result: String,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    /// A mock that lists one `retriever` tool and returns `call_result` on every call.
    pub fn retriever(call_result: impl Into<String>) -> Self {
        Self::new(
            vec![ToolSpec {
                name: "retriever".to_string(),
                description: Some("Search the indexed documents.".to_string()),
                input_schema: json!({
                    "type": "object",
                    "properties": { "query": { "type": "string" } },
                    "required": ["query"]
                }),
            }],
            call_result.into(),
        )
    }

    /// Creates a mock with custom tool list and fixed call result.
    pub fn new(tools: Vec<ToolSpec>, call_result: String) -> Self {
        Self {
            tools,
            call_result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far as `(name, arguments)`.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        Ok(ToolCallContent {
            text: self.call_result.clone(),
        })
    }
}
