//! Parse a chat request into runner inputs.
//!
//! Used by HTTP handlers to validate the message and resolve the thread id before
//! any graph work happens.

use thiserror::Error;

use super::request::ChatRequest;

/// Annotation returned when the server generated the thread id.
pub const GENERATED_THREAD_ANNOTATION: &str = "Thread ID not provided. Generated new thread ID.";

/// Result of parsing a chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChatRequest {
    /// The human message for this turn.
    pub user_message: String,
    /// Caller's thread id, or a fresh UUID v4.
    pub thread_id: String,
    /// Empty, or [`GENERATED_THREAD_ANNOTATION`] when the id was generated.
    pub annotation: String,
    pub thread_generated: bool,
}

/// Errors while parsing a chat request. Both map to HTTP 400.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Message is required")]
    MissingMessage,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

/// Deserializes a raw JSON body. An empty body reads as `{}`.
pub fn parse_chat_body(body: &[u8]) -> Result<ChatRequest, ParseError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ChatRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ParseError::InvalidBody(e.to_string()))
}

/// Validates `message` and resolves the thread id.
///
/// - **user_message**: `message`; missing or empty is `ParseError::MissingMessage`.
/// - **thread_id**: `threadId` when non-empty; otherwise a new UUID v4 and the annotation is set.
pub fn parse_chat_request(req: &ChatRequest) -> Result<ParsedChatRequest, ParseError> {
    let user_message = req
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or(ParseError::MissingMessage)?
        .to_string();

    let (thread_id, thread_generated) = match req.thread_id.as_deref().filter(|t| !t.is_empty()) {
        Some(t) => (t.to_string(), false),
        None => (uuid::Uuid::new_v4().to_string(), true),
    };
    let annotation = if thread_generated {
        GENERATED_THREAD_ANNOTATION.to_string()
    } else {
        String::new()
    };

    Ok(ParsedChatRequest {
        user_message,
        thread_id,
        annotation,
        thread_generated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(message: Option<&str>, thread_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: message.map(String::from),
            thread_id: thread_id.map(String::from),
        }
    }

    /// **Scenario**: Without threadId a UUID is generated and annotated.
    #[test]
    fn generates_thread_id_with_annotation() {
        let p = parse_chat_request(&req(Some("hi"), None)).unwrap();
        assert!(p.thread_generated);
        assert_eq!(p.annotation, GENERATED_THREAD_ANNOTATION);
        assert!(uuid::Uuid::parse_str(&p.thread_id).is_ok());

        let other = parse_chat_request(&req(Some("hi"), Some(""))).unwrap();
        assert!(other.thread_generated);
        assert_ne!(other.thread_id, p.thread_id);
    }

    /// **Scenario**: A supplied threadId is kept and the annotation is empty.
    #[test]
    fn keeps_supplied_thread_id() {
        let p = parse_chat_request(&req(Some("hi"), Some("t-42"))).unwrap();
        assert_eq!(p.thread_id, "t-42");
        assert_eq!(p.annotation, "");
        assert_eq!(p.user_message, "hi");
    }

    /// **Scenario**: Missing or empty message is rejected.
    #[test]
    fn missing_message_rejected() {
        assert_eq!(parse_chat_request(&req(None, Some("t"))), Err(ParseError::MissingMessage));
        assert_eq!(parse_chat_request(&req(Some(""), None)), Err(ParseError::MissingMessage));
        assert_eq!(ParseError::MissingMessage.to_string(), "Message is required");
    }

    /// **Scenario**: Malformed JSON is InvalidBody.
    #[test]
    fn parse_chat_body_rejects_bad_json() {
        assert!(matches!(parse_chat_body(b"{not json"), Err(ParseError::InvalidBody(_))));
        assert_eq!(
            parse_chat_body(br#"{"message":"m"}"#).unwrap().message.as_deref(),
            Some("m")
        );
        assert_eq!(parse_chat_body(b"").unwrap(), ChatRequest::default());
    }
}
