//! # raggraph
//!
//! Agentic retrieval chat as a small state graph. A question enters the **agent**,
//! which either answers directly or asks the retrieval tool; retrieved documents are
//! **graded**, and the run either **generates** a grounded answer or **rewrites** the
//! question and loops back to the agent.
//!
//! ```text
//! START → agent ─┬─ tool call ──→ retrieve → grade_documents ─┬─ yes → generate → END
//!                └─ no tool ──→ END                            └─ no ──→ rewrite → agent
//! ```
//!
//! ## Design Principles
//!
//! - **Single state type**: every node reads the thread's [`ChatState`] and returns a
//!   [`ChatUpdate`] of messages to append. State only grows.
//! - **Validated topology**: routers return enums implementing [`graph::Route`];
//!   `compile` rejects a path map that misses a variant.
//! - **Per-thread checkpoints**: the input state and every step are saved through a
//!   [`Checkpointer`]; the next turn on the same thread continues from the latest one.
//! - **Two delivery modes**: `RagRunner::invoke` returns the final state,
//!   `RagRunner::stream` yields one event per step over an mpsc channel.
//!
//! ## Main Modules
//!
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Route`: build and run state graphs.
//! - [`rag`]: the five nodes, routers, `build_rag_graph` and `RagRunner`.
//! - [`llm`]: `LlmClient` trait, `MockLlm`, and `ChatOpenAI` (feature `openai`).
//! - [`memory`]: checkpoints, `MemorySaver`, per-thread locks.
//! - [`retrieval`]: document loading, splitting, embedding and the in-memory vector store.
//! - [`tool_source`]: tool specs and the retriever tool.
//! - [`rag_builder`]: `RagBuildConfig::from_env` and runner wiring.
//! - [`chat_api`]: request parsing, JSON bodies and SSE frames for the HTTP server.
//!
//! ## Features
//!
//! - `openai`: OpenAI-compatible chat and embeddings via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use raggraph::{ChatState, LlmResponse, MemorySaver, MockLlm, MockToolSource, RagRunner};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let runner = RagRunner::new(
//!     Arc::new(MockLlm::new([LlmResponse::text("Hello!")])),
//!     Arc::new(MockToolSource::retriever("docs")),
//!     Arc::new(MemorySaver::<ChatState>::new()),
//! )
//! .unwrap();
//! let state = runner.invoke("thread-1", "hi").await.unwrap();
//! assert_eq!(state.messages.last().unwrap().content, "Hello!");
//! # }
//! ```

pub mod chat_api;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod rag;
pub mod rag_builder;
pub mod retrieval;
pub mod state;
pub mod stream;
pub mod tool_source;

pub use chat_api::{
    parse_chat_body, parse_chat_request, ChatQuery, ChatRequest, ChatResponse, ErrorBody,
    ParseError, ParsedChatRequest, StreamToSse, ThreadStateResponse,
};
pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, GraphState, Node, Route, StateGraph, END, START};
pub use llm::{LlmClient, LlmResponse, MockLlm, ToolChoiceMode};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use memory::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, CheckpointSource,
    Checkpointer, MemorySaver, RunnableConfig, ThreadLocks,
};
pub use message::{Message, Role, ToolCall};
pub use rag::{build_rag_graph, RagRunner, RunError};
#[cfg(feature = "openai")]
pub use rag_builder::build_rag_runner;
pub use rag_builder::{build_rag_runner_with, BuildRunnerError, RagBuildConfig};
pub use retrieval::{Document, Embedder, HashingEmbedder, InMemoryVectorStore, Retriever, RetrievalError};
pub use state::{ChatState, ChatUpdate};
pub use stream::{StreamEvent, StreamMode};
pub use tool_source::{MockToolSource, RetrieverToolSource, ToolSource, ToolSourceError, ToolSpec};
