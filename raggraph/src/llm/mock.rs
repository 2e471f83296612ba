//! Scripted LLM for tests.
//!
//! Returns queued responses in order and records every call, so tests can assert
//! which messages, tools and tool choice each node sent to the model.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::tool_source::ToolSpec;

use super::{LlmClient, LlmResponse, ToolChoiceMode};

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub tool_choice: ToolChoiceMode,
}

/// Mock LLM: pops one scripted response per call.
///
/// When the script is exhausted the call fails with `ExecutionFailed`, which
/// doubles as a way to simulate a collaborator failure.
///
/// **Interaction**: Implements `LlmClient`; used by node and graph tests.
#[derive(Default)]
pub struct MockLlm {
    responses: Mutex<VecDeque<LlmResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl MockLlm {
    pub fn new(responses: impl IntoIterator<Item = LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Sleeps before every answer; used to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Appends a response to the script.
    pub fn push(&self, response: LlmResponse) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
        tool_choice: ToolChoiceMode,
    ) -> Result<LlmResponse, AgentError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                messages: messages.to_vec(),
                tools: tools.to_vec(),
                tool_choice,
            });
        }
        let next = self
            .responses
            .lock()
            .map_err(|_| AgentError::ExecutionFailed("mock llm lock poisoned".into()))?
            .pop_front();
        next.ok_or_else(|| AgentError::ExecutionFailed("mock llm script exhausted".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Responses are returned in script order; calls are recorded.
    #[tokio::test]
    async fn mock_llm_returns_script_in_order() {
        let llm = MockLlm::new([LlmResponse::text("one"), LlmResponse::text("two")]);
        let first = llm.invoke(&[Message::human("a")]).await.unwrap();
        let second = llm.invoke(&[Message::human("b")]).await.unwrap();
        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].messages[0].content, "b");
        assert_eq!(calls[0].tool_choice, ToolChoiceMode::None);
    }

    /// **Scenario**: An exhausted script fails the call instead of panicking.
    #[tokio::test]
    async fn mock_llm_exhausted_script_errors() {
        let llm = MockLlm::default();
        let err = llm.invoke(&[]).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(ref m) if m.contains("exhausted")));
    }
}
