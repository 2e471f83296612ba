//! HTTP surface: `POST /chat` (buffered JSON or SSE) and `GET /threads/:thread_id`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use raggraph::chat_api::{ErrorBody, PROCESSING_ERROR};
use raggraph::{
    parse_chat_body, parse_chat_request, ChatQuery, ChatResponse, ParseError, ParsedChatRequest,
    RagRunner, RunError, StreamToSse, ThreadStateResponse,
};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

/// Frames buffered between the run and a slow client.
const SSE_CHANNEL_CAPACITY: usize = 256;

/// Response header carrying the thread id of a streamed run.
pub const THREAD_ID_HEADER: &str = "x-thread-id";

/// Shared state for all routes.
pub struct AppState {
    pub runner: RagRunner,
}

/// Builds the router with tracing spans and permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/threads/:thread_id", get(thread_state))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<Body>| {
                info_span!("request", method = %req.method(), uri = %req.uri())
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChatQuery>,
    body: Bytes,
) -> Result<Response, ServerError> {
    let request = parse_chat_body(&body)?;
    let parsed = parse_chat_request(&request)?;
    tracing::debug!(
        thread_id = %parsed.thread_id,
        generated = parsed.thread_generated,
        stream = query.wants_stream(),
        "chat request"
    );

    if query.wants_stream() {
        return Ok(sse_response(&state.runner, &parsed));
    }

    let final_state = state
        .runner
        .invoke(&parsed.thread_id, &parsed.user_message)
        .await
        .map_err(|e| ServerError::Processing {
            thread_id: parsed.thread_id.clone(),
            source: e,
        })?;
    Ok(Json(ChatResponse::from_state(&final_state, &parsed)).into_response())
}

/// Spawns the run and returns an event-stream response fed from its frames.
fn sse_response(runner: &RagRunner, parsed: &ParsedChatRequest) -> Response {
    let (tx, rx) = mpsc::channel::<String>(SSE_CHANNEL_CAPACITY);
    let events = runner.stream(&parsed.thread_id, &parsed.user_message);
    tokio::spawn(StreamToSse::new_with_sink(tx).forward(events));

    let stream = ReceiverStream::new(rx).map(|s| Ok::<_, std::io::Error>(Bytes::from(s)));
    let mut res = Response::new(Body::from_stream(stream));
    let headers = res.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    if let Ok(v) = HeaderValue::from_str(&parsed.thread_id) {
        headers.insert(THREAD_ID_HEADER, v);
    }
    res
}

async fn thread_state(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Result<Json<ThreadStateResponse>, ServerError> {
    let found = state
        .runner
        .thread_state(&thread_id)
        .await
        .map_err(|e| ServerError::Processing {
            thread_id: thread_id.clone(),
            source: e,
        })?;
    match found {
        Some(s) => Ok(Json(ThreadStateResponse {
            thread_id,
            messages: s.messages,
        })),
        None => Err(ServerError::NotFound(thread_id)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("thread not found: {0}")]
    NotFound(String),
    #[error("run failed on thread {thread_id}: {source}")]
    Processing { thread_id: String, source: RunError },
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ServerError::Parse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Processing { thread_id, source } => {
                tracing::error!(thread_id = %thread_id, error = %source, "chat run failed");
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR.to_string())
            }
        };
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}
