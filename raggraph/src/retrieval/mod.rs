//! # Retrieval collaborators
//!
//! Everything the retrieval tool needs, prepared once at startup before the graph
//! serves requests:
//!
//! - [`load_documents`]: read `.txt` / `.md` / `.pdf` files (or directories of them).
//! - [`TextSplitter`]: split documents into overlapping chunks.
//! - [`Embedder`]: text → vector ([`HashingEmbedder`] offline, `OpenAIEmbedder` with feature `openai`).
//! - [`InMemoryVectorStore`]: cosine top-k search; implements [`Retriever`].
//!
//! The graph only sees the [`Retriever`] trait, through
//! [`RetrieverToolSource`](crate::tool_source::RetrieverToolSource).

mod document;
mod embedder;
mod loader;
mod pdf;
mod splitter;
mod vector_store;

#[cfg(feature = "openai")]
mod openai_embedder;

use thiserror::Error;

pub use document::Document;
pub use embedder::{Embedder, HashingEmbedder, DEFAULT_HASHING_DIMENSION};
pub use loader::{load_documents, SUPPORTED_EXTENSIONS};
pub use splitter::TextSplitter;
pub use vector_store::{InMemoryVectorStore, Retriever, DEFAULT_EMBED_BATCH_SIZE, DEFAULT_TOP_K};

#[cfg(feature = "openai")]
pub use openai_embedder::OpenAIEmbedder;
#[cfg(feature = "openai")]
pub(crate) use openai_embedder::default_dimension;

/// Error from loading, splitting, embedding or searching documents.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Reading a file or directory failed.
    #[error("io error at {path}: {message}")]
    Io { path: String, message: String },
    /// A PDF could not be parsed or its page content could not be decoded.
    #[error("pdf error at {path}: {message}")]
    Pdf { path: String, message: String },
    /// A file given explicitly has an extension the loader does not read.
    #[error("unsupported document: {0}")]
    Unsupported(String),
    /// Splitter or store configured with impossible values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Embedding call failed or returned the wrong number of vectors.
    #[error("embedding error: {0}")]
    Embedding(String),
}
