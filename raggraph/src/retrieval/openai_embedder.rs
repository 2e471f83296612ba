//! OpenAI embeddings implementing [`Embedder`] (feature `openai`).

use async_openai::{config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;

use super::{Embedder, RetrievalError};

/// Embeddings via the OpenAI (or compatible) `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl OpenAIEmbedder {
    /// `dimension` must match what `model` returns (1536 for `text-embedding-3-small`).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            dimension,
        }
    }
}

/// Known output sizes of the OpenAI embedding models.
pub(crate) fn default_dimension(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let input: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(input)
            .build()
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;
        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                data.len()
            )));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
