//! Builds the retriever tool and the runner from [`RagBuildConfig`](super::config::RagBuildConfig).

mod error;
#[cfg(feature = "openai")]
mod llm;

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::memory::MemorySaver;
use crate::rag::RagRunner;
use crate::retrieval::{
    load_documents, Embedder, HashingEmbedder, InMemoryVectorStore, TextSplitter,
};
use crate::state::ChatState;
use crate::tool_source::RetrieverToolSource;

use super::config::RagBuildConfig;

pub use error::BuildRunnerError;
#[cfg(feature = "openai")]
pub use llm::build_default_llm;

/// OpenAI embeddings when a model is configured (feature `openai`), else hashing.
fn build_embedder(config: &RagBuildConfig) -> Result<Arc<dyn Embedder>, BuildRunnerError> {
    match config.embedding_model.as_deref() {
        #[cfg(feature = "openai")]
        Some(model) => llm::build_openai_embedder(config, model),
        #[cfg(not(feature = "openai"))]
        Some(model) => {
            tracing::warn!(model = %model, "embedding model configured without the openai feature; using hashing embedder");
            Ok(Arc::new(HashingEmbedder::default()))
        }
        None => Ok(Arc::new(HashingEmbedder::default())),
    }
}

/// Loads and splits `config.docs_paths`, indexes the chunks and wraps the index
/// as the retrieval tool. No paths gives an empty index.
pub async fn build_retriever_tool(
    config: &RagBuildConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<RetrieverToolSource, BuildRunnerError> {
    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
    let store = InMemoryVectorStore::new(embedder).with_top_k(config.top_k);

    if config.docs_paths.is_empty() {
        tracing::warn!("DOCS_PATHS not set; the retriever index is empty");
    } else {
        let documents = load_documents(&config.docs_paths).await?;
        let chunks = splitter.split_documents(&documents);
        tracing::info!(documents = documents.len(), chunks = chunks.len(), "indexing documents");
        store.add_documents(chunks).await?;
    }

    Ok(RetrieverToolSource::new(
        Arc::new(store),
        config.retriever_tool_name.clone(),
        config.retriever_tool_description.clone(),
    ))
}

/// Builds the runner with a caller-supplied model client (tests, other providers).
pub async fn build_rag_runner_with(
    config: &RagBuildConfig,
    llm: Arc<dyn LlmClient>,
) -> Result<RagRunner, BuildRunnerError> {
    let embedder = build_embedder(config)?;
    let tools = build_retriever_tool(config, embedder).await?;
    let checkpointer =
        MemorySaver::<ChatState>::new().with_history_limit(config.checkpoint_history);
    let runner = RagRunner::new(llm, Arc::new(tools), Arc::new(checkpointer))?
        .with_recursion_limit(config.recursion_limit);
    Ok(runner)
}

/// Builds the runner with the default OpenAI chat model.
#[cfg(feature = "openai")]
pub async fn build_rag_runner(config: &RagBuildConfig) -> Result<RagRunner, BuildRunnerError> {
    let llm = build_default_llm(config)?;
    build_rag_runner_with(config, llm).await
}
