//! In-memory vector store with cosine similarity search.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Document, Embedder, RetrievalError};

/// Documents returned per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Texts per `Embedder::embed` call when indexing; embedding APIs cap inputs per request.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 512;

/// Query → ranked documents (best first).
///
/// **Interaction**: Wrapped by `RetrieverToolSource`, which is what the graph calls.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RetrievalError>;
}

#[derive(Clone)]
struct VectorEntry {
    vector: Vec<f32>,
    document: Document,
}

/// Pure in-memory vector store.
///
/// **In-Memory**: All data stored in memory, lost when the store is dropped.
pub struct InMemoryVectorStore {
    /// Keyed by insertion sequence; ties in score resolve to the earlier document.
    data: DashMap<usize, VectorEntry>,
    next_id: AtomicUsize,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    batch_size: usize,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            data: DashMap::new(),
            next_id: AtomicUsize::new(0),
            embedder,
            top_k: DEFAULT_TOP_K,
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    /// Sets how many texts `add_documents` sends per embedding call.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets how many documents `retrieve` returns.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Computes cosine similarity between two vectors.
    ///
    /// Returns 0.0 if either vector has zero magnitude.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot_product / (norm_a * norm_b)
        }
    }

    /// Embeds and indexes documents, `batch_size` texts per embedding call.
    ///
    /// A failed batch fails the whole call; batches indexed before it stay.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<(), RetrievalError> {
        let mut documents = documents.into_iter().peekable();
        let mut batches = 0usize;
        while documents.peek().is_some() {
            let batch: Vec<Document> = documents.by_ref().take(self.batch_size).collect();
            let texts: Vec<&str> = batch.iter().map(|d| d.content.as_str()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(RetrievalError::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for (vector, document) in vectors.into_iter().zip(batch) {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                self.data.insert(id, VectorEntry { vector, document });
            }
            batches += 1;
        }
        if batches > 0 {
            tracing::debug!(batches = batches, total = self.data.len(), "indexed documents");
        }
        Ok(())
    }

    /// Top `k` documents by cosine similarity to `query`, best first, with scores.
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, RetrievalError> {
        let query_vec = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("No vector returned".into()))?;

        let mut scored: Vec<(usize, f32)> = self
            .data
            .iter()
            .map(|entry| (*entry.key(), Self::cosine_similarity(&query_vec, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .filter_map(|(id, score)| self.data.get(&id).map(|e| (e.document.clone(), score)))
            .collect())
    }
}

#[async_trait]
impl Retriever for InMemoryVectorStore {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RetrievalError> {
        let hits = self.similarity_search(query, self.top_k).await?;
        tracing::debug!(query = query, hits = hits.len(), "retrieved documents");
        Ok(hits.into_iter().map(|(doc, _)| doc).collect())
    }
}
