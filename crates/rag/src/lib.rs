//! Retrieval-augmented answering support
//!
//! Features:
//! - Flat inner-product knowledge store with JSON persistence
//! - Optional Qdrant-backed store (feature `qdrant`)
//! - Hash and Ollama text embedders
//! - Fixed-window character chunking with overlap
//! - Knowledge folder ingestion (txt, yaml, json)
//! - Retrieval agent with a deterministic grounded prompt

pub mod chunker;
pub mod embeddings;
pub mod knowledge_loader;
pub mod ollama_embeddings;
#[cfg(feature = "qdrant")]
pub mod qdrant_store;
pub mod retrieval;
pub mod vector_store;

pub use chunker::{ChunkConfig, Chunker};
pub use embeddings::{EmbeddingConfig, HashEmbedder, TextEmbedder};
pub use knowledge_loader::{KnowledgeDocument, KnowledgeFile, KnowledgeLoader};
pub use ollama_embeddings::{OllamaEmbedder, OllamaEmbeddingConfig};
#[cfg(feature = "qdrant")]
pub use qdrant_store::{QdrantKnowledgeStore, QdrantStoreConfig};
pub use retrieval::{build_prompt, RetrievalAgent};
pub use vector_store::{FlatIndexConfig, FlatIndexStore};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Knowledge store error: {0}")]
    Store(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<RagError> for barge_core::Error {
    fn from(err: RagError) -> Self {
        barge_core::Error::Rag(err.to_string())
    }
}
