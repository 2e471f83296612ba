//! Server-sent event frames for streamed runs.
//!
//! One `data:` frame per graph step carrying the last message of the step's delta,
//! then `data: {"done":true}`. A failed run ends with an error frame instead of the
//! done frame.

use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};

use crate::error::AgentError;
use crate::message::{Message, Role, ToolCall};
use crate::state::ChatState;
use crate::stream::StreamEvent;

/// Payload of one step frame: `{ type, content, tool_calls? }`.
///
/// `tool_calls` is present (possibly empty) on ai messages and absent otherwise.
#[derive(Debug, Serialize)]
pub struct StepEvent<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<&'a [ToolCall]>,
}

impl<'a> From<&'a Message> for StepEvent<'a> {
    fn from(m: &'a Message) -> Self {
        Self {
            kind: m.role.as_str(),
            content: &m.content,
            tool_calls: (m.role == Role::Ai).then_some(m.tool_calls.as_slice()),
        }
    }
}

fn frame(value: &impl Serialize) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    format!("data: {}\n\n", json)
}

/// `data: {"type":..,"content":..,"tool_calls":..}` for one step.
pub fn event_frame(message: &Message) -> String {
    frame(&StepEvent::from(message))
}

/// `data: {"done":true}`.
pub fn done_frame() -> String {
    frame(&json!({ "done": true }))
}

/// `data: {"error":{"message":..}}`.
pub fn error_frame(error: &AgentError) -> String {
    frame(&json!({ "error": { "message": error.to_string() } }))
}

/// Adapter from graph stream events to SSE frames written into a channel.
///
/// **Interaction**: The server spawns [`StreamToSse::forward`] with the receiver
/// half as the HTTP body. When the client goes away the sink closes, forwarding
/// stops and the dropped event stream cancels the run after its current step.
pub struct StreamToSse {
    sink: mpsc::Sender<String>,
    failed: bool,
}

impl StreamToSse {
    pub fn new_with_sink(sink: mpsc::Sender<String>) -> Self {
        Self {
            sink,
            failed: false,
        }
    }

    /// Writes the frame for one event. Returns false once the sink is closed.
    pub async fn feed(&mut self, event: StreamEvent<ChatState>) -> bool {
        let frame = match &event {
            StreamEvent::Updates { update, node_id } => match update.last_message() {
                Some(m) => event_frame(m),
                None => {
                    tracing::debug!(node_id = %node_id, "step produced no messages");
                    return true;
                }
            },
            StreamEvent::Values(_) => return true,
            StreamEvent::Error(e) => {
                self.failed = true;
                error_frame(e)
            }
        };
        self.sink.send(frame).await.is_ok()
    }

    /// Writes the done frame unless the run failed.
    pub async fn finish(self) {
        if !self.failed {
            let _ = self.sink.send(done_frame()).await;
        }
    }

    /// Feeds every event, then finishes. Stops early when the sink closes.
    pub async fn forward<St>(mut self, mut events: St)
    where
        St: Stream<Item = StreamEvent<ChatState>> + Unpin,
    {
        while let Some(event) = events.next().await {
            if !self.feed(event).await {
                tracing::info!("SSE consumer gone, stopping stream");
                return;
            }
        }
        self.finish().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatUpdate;
    use serde_json::Value;

    fn payload(frame: &str) -> Value {
        let body = frame
            .strip_prefix("data: ")
            .and_then(|s| s.strip_suffix("\n\n"))
            .expect("sse frame");
        serde_json::from_str(body).unwrap()
    }

    /// **Scenario**: Ai frames carry tool_calls (even empty); human/tool frames omit them.
    #[test]
    fn event_frame_shapes() {
        let ai = payload(&event_frame(&Message::ai("hello")));
        assert_eq!(ai, json!({ "type": "ai", "content": "hello", "tool_calls": [] }));
        let tool = payload(&event_frame(&Message::tool("docs", "c1")));
        assert_eq!(tool, json!({ "type": "tool", "content": "docs" }));
        assert_eq!(payload(&done_frame()), json!({ "done": true }));
        let err = payload(&error_frame(&AgentError::ExecutionFailed("x".into())));
        assert!(err["error"]["message"].as_str().unwrap().contains("x"));
    }

    /// **Scenario**: forward writes one frame per step then done; an error replaces done.
    #[tokio::test]
    async fn forward_writes_frames_and_done() {
        let (tx, mut rx) = mpsc::channel(16);
        let events = tokio_stream::iter(vec![
            StreamEvent::<ChatState>::Updates {
                node_id: "agent".into(),
                update: ChatUpdate::message(Message::ai("hi")),
            },
        ]);
        StreamToSse::new_with_sink(tx).forward(events).await;
        let mut frames = Vec::new();
        while let Some(f) = rx.recv().await {
            frames.push(f);
        }
        assert_eq!(frames.len(), 2);
        assert_eq!(payload(&frames[1]), json!({ "done": true }));

        let (tx, mut rx) = mpsc::channel(16);
        let events = tokio_stream::iter(vec![StreamEvent::<ChatState>::Error(AgentError::Cancelled)]);
        StreamToSse::new_with_sink(tx).forward(events).await;
        let mut frames = Vec::new();
        while let Some(f) = rx.recv().await {
            frames.push(f);
        }
        assert_eq!(frames.len(), 1);
        assert!(payload(&frames[0]).get("error").is_some());
    }

    /// **Scenario**: A closed sink stops forwarding without panicking.
    #[tokio::test]
    async fn forward_stops_when_sink_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let events = tokio_stream::iter(vec![StreamEvent::<ChatState>::Updates {
            node_id: "agent".into(),
            update: ChatUpdate::message(Message::ai("hi")),
        }]);
        StreamToSse::new_with_sink(tx).forward(events).await;
    }
}
