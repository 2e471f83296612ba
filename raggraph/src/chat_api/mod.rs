//! Chat wire format: request parsing, buffered JSON responses and SSE frames.
//!
//! Transport-independent; the server binary maps these onto HTTP.

mod parse;
mod request;
mod response;
mod sse;

pub use parse::{parse_chat_body, parse_chat_request, ParseError, ParsedChatRequest, GENERATED_THREAD_ANNOTATION};
pub use request::{ChatQuery, ChatRequest};
pub use response::{ChatResponse, ErrorBody, ThreadStateResponse, PROCESSING_ERROR};
pub use sse::{done_frame, error_frame, event_frame, StepEvent, StreamToSse};
