//! Conversation state for the retrieval graph.
//!
//! `ChatState` is the per-thread append-only message log; nodes return a
//! `ChatUpdate` holding the messages to append.

use serde::{Deserialize, Serialize};

use crate::graph::GraphState;
use crate::message::{Message, Role};

/// Messages of one thread in causal order. Never reordered, only extended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
}

/// Delta produced by one node: messages to append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUpdate {
    pub messages: Vec<Message>,
}

impl ChatUpdate {
    pub fn message(message: Message) -> Self {
        Self {
            messages: vec![message],
        }
    }

    /// Last message of the delta; what a streamed event reports for the step.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl GraphState for ChatState {
    type Update = ChatUpdate;

    fn apply(&mut self, update: ChatUpdate) {
        self.messages.extend(update.messages);
    }
}

impl ChatState {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent human message: the question currently being answered (or its rewrite).
    pub fn current_question(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Human)
    }

    /// Tool messages answering the most recent retrieval request, in call order.
    ///
    /// The request is the last ai message with tool calls that precedes the latest
    /// tool message; later grading messages are skipped. Empty when nothing was retrieved.
    pub fn latest_tool_results(&self) -> Vec<&Message> {
        let Some(last_tool) = self.messages.iter().rposition(|m| m.role == Role::Tool) else {
            return Vec::new();
        };
        let request = self.messages[..last_tool]
            .iter()
            .rposition(|m| m.role == Role::Ai && m.has_tool_calls());
        let Some(request) = request else {
            return vec![&self.messages[last_tool]];
        };
        let calls = &self.messages[request].tool_calls;
        let answers: Vec<&Message> = self.messages[request + 1..=last_tool]
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        let mut ordered: Vec<&Message> = calls
            .iter()
            .filter_map(|c| {
                answers
                    .iter()
                    .copied()
                    .find(|m| m.tool_call_id.as_deref() == Some(c.id.as_str()))
            })
            .collect();
        if ordered.is_empty() {
            ordered = answers;
        }
        ordered
    }
}
