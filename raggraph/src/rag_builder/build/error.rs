//! Error type for building the runner.

use crate::graph::CompilationError;
use crate::retrieval::RetrievalError;

/// Error when building the runner from config.
#[derive(Debug, thiserror::Error)]
pub enum BuildRunnerError {
    /// `OPENAI_API_KEY` is needed for the chat model or the embedding model.
    #[error("OPENAI_API_KEY must be set")]
    MissingApiKey,
    #[error("invalid value for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },
    #[error("retrieval setup failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("graph compilation failed: {0}")]
    Compilation(#[from] CompilationError),
}
