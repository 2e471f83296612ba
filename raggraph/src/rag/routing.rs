//! Routers for the two conditional edges.
//!
//! Both are pure functions of the merged state: identical state always yields the
//! same route.

use serde_json::Value;

use crate::error::AgentError;
use crate::graph::Route;
use crate::message::Role;
use crate::state::ChatState;

use super::prompts::GRADE_TOOL_NAME;

/// Destinations after the Agent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveRoute {
    /// The model asked for a tool call.
    Retrieve,
    /// The model answered directly.
    End,
}

impl Route for RetrieveRoute {
    fn variants() -> &'static [Self] {
        &[RetrieveRoute::Retrieve, RetrieveRoute::End]
    }

    fn label(&self) -> &'static str {
        match self {
            RetrieveRoute::Retrieve => "retrieve",
            RetrieveRoute::End => "end",
        }
    }
}

/// Grading verdict; the destinations after GradeDocuments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Yes,
    No,
}

impl Route for Relevance {
    fn variants() -> &'static [Self] {
        &[Relevance::Yes, Relevance::No]
    }

    fn label(&self) -> &'static str {
        match self {
            Relevance::Yes => "yes",
            Relevance::No => "no",
        }
    }
}

impl Relevance {
    /// Parses a verdict after trimming and lowercasing; anything but yes/no is None.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Relevance::Yes),
            "no" => Some(Relevance::No),
            _ => None,
        }
    }
}

/// Retrieve when the latest message is an ai message carrying tool calls.
pub fn should_retrieve(state: &ChatState) -> Result<RetrieveRoute, AgentError> {
    let route = match state.last_message() {
        Some(m) if m.role == Role::Ai && m.has_tool_calls() => RetrieveRoute::Retrieve,
        _ => RetrieveRoute::End,
    };
    Ok(route)
}

/// Reads `binary_score` from the grading tool call on the latest message.
///
/// A missing grading call or a score other than yes/no is `InvalidVerdict`.
pub fn check_relevance(state: &ChatState) -> Result<Relevance, AgentError> {
    let call = state
        .last_message()
        .and_then(|m| m.tool_calls.iter().find(|c| c.name == GRADE_TOOL_NAME))
        .ok_or_else(|| {
            AgentError::InvalidVerdict(format!("no {} call on the latest message", GRADE_TOOL_NAME))
        })?;
    let score = call
        .args
        .get("binary_score")
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::InvalidVerdict(format!("missing binary_score in {}", call.args)))?;
    Relevance::parse(score).ok_or_else(|| AgentError::InvalidVerdict(score.to_string()))
}
