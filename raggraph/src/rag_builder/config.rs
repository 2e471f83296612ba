//! Configuration for building the retrieval runner.
//!
//! Every field has a default, so an empty environment yields a runnable (if
//! document-less) configuration apart from the model API key.

use std::path::PathBuf;

use crate::graph::DEFAULT_RECURSION_LIMIT;
use crate::memory::DEFAULT_HISTORY_LIMIT;
use crate::retrieval::DEFAULT_TOP_K;
use crate::tool_source::DEFAULT_RETRIEVER_NAME;

use super::build::BuildRunnerError;

/// Listening port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Chat model when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for building the runner and serving it.
#[derive(Clone, Debug)]
pub struct RagBuildConfig {
    /// `PORT`.
    pub port: u16,
    /// `RETRIEVER_TOOL_NAME` (also accepts the legacy `RETREIVER_TOOL_NAME`).
    pub retriever_tool_name: String,
    /// `RETRIEVER_TOOL_DESCRIPTION`; empty means a generic description.
    pub retriever_tool_description: String,
    /// `OPENAI_API_KEY`.
    pub openai_api_key: Option<String>,
    /// `OPENAI_MODEL`.
    pub model: String,
    /// `OPENAI_BASE_URL`, falling back to `OPENAI_API_BASE`.
    pub openai_base_url: Option<String>,
    /// `OPENAI_EMBEDDING_MODEL`; unset means the offline hashing embedder.
    pub embedding_model: Option<String>,
    /// `DOCS_PATHS`, comma separated files or directories.
    pub docs_paths: Vec<PathBuf>,
    /// `CHUNK_SIZE`.
    pub chunk_size: usize,
    /// `CHUNK_OVERLAP`.
    pub chunk_overlap: usize,
    /// `RETRIEVER_TOP_K`.
    pub top_k: usize,
    /// `RECURSION_LIMIT`.
    pub recursion_limit: usize,
    /// `CHECKPOINT_HISTORY`, checkpoints kept per thread.
    pub checkpoint_history: usize,
}

impl Default for RagBuildConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            retriever_tool_name: DEFAULT_RETRIEVER_NAME.to_string(),
            retriever_tool_description: String::new(),
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: None,
            embedding_model: None,
            docs_paths: Vec::new(),
            chunk_size: 1000,
            chunk_overlap: 50,
            top_k: DEFAULT_TOP_K,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            checkpoint_history: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, BuildRunnerError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| BuildRunnerError::InvalidConfig {
            key: key.to_string(),
            value,
        }),
    }
}

impl RagBuildConfig {
    /// Reads the process environment (call `dotenv` first to include `.env`).
    pub fn from_env() -> Result<Self, BuildRunnerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BuildRunnerError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            port: parse_num("PORT", get("PORT"), defaults.port)?,
            retriever_tool_name: get("RETRIEVER_TOOL_NAME")
                .or_else(|| get("RETREIVER_TOOL_NAME"))
                .unwrap_or(defaults.retriever_tool_name),
            retriever_tool_description: get("RETRIEVER_TOOL_DESCRIPTION")
                .or_else(|| get("RETREIVER_TOOL_DESCRIPTION"))
                .unwrap_or_default(),
            openai_api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            openai_base_url: get("OPENAI_BASE_URL").or_else(|| get("OPENAI_API_BASE")),
            embedding_model: get("OPENAI_EMBEDDING_MODEL"),
            docs_paths: get("DOCS_PATHS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(PathBuf::from)
                        .collect()
                })
                .unwrap_or_default(),
            chunk_size: parse_num("CHUNK_SIZE", get("CHUNK_SIZE"), defaults.chunk_size)?,
            chunk_overlap: parse_num("CHUNK_OVERLAP", get("CHUNK_OVERLAP"), defaults.chunk_overlap)?,
            top_k: parse_num("RETRIEVER_TOP_K", get("RETRIEVER_TOP_K"), defaults.top_k)?,
            recursion_limit: parse_num(
                "RECURSION_LIMIT",
                get("RECURSION_LIMIT"),
                defaults.recursion_limit,
            )?,
            checkpoint_history: parse_num(
                "CHECKPOINT_HISTORY",
                get("CHECKPOINT_HISTORY"),
                defaults.checkpoint_history,
            )?,
        })
    }
}
