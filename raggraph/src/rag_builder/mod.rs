//! Startup wiring: builds the retrieval index, the model client and the runner from config.
//!
//! Used by the server binary. [`RagBuildConfig::from_env`] reads the process
//! environment; [`build_rag_runner`] (feature `openai`) or [`build_rag_runner_with`]
//! turn it into a ready [`RagRunner`](crate::rag::RagRunner).

mod build;
mod config;

pub use build::{build_rag_runner_with, build_retriever_tool, BuildRunnerError};
#[cfg(feature = "openai")]
pub use build::{build_default_llm, build_rag_runner};
pub use config::{RagBuildConfig, DEFAULT_MODEL, DEFAULT_PORT};
