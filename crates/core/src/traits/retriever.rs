//! Retrieval traits for RAG

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Knowledge store interface
///
/// Implementations:
/// - `FlatIndexStore` - exact inner-product search with JSON persistence
/// - `QdrantKnowledgeStore` - Qdrant collection (feature `qdrant`)
///
/// # Example
///
/// ```ignore
/// let store: Arc<dyn KnowledgeStore> = Arc::new(FlatIndexStore::open(config, embedder)?);
/// store.ingest(&[SourceDocument::new("faq.txt", "Rust has no GC.")]).await?;
/// for chunk in store.search("does rust have a gc", 3).await? {
///     println!("{} {:.3}", chunk.doc_id, chunk.score);
/// }
/// ```
#[async_trait]
pub trait KnowledgeStore: Send + Sync + 'static {
    /// Search for chunks similar to `query`
    ///
    /// # Returns
    /// At most `top_k` chunks sorted by score (highest first)
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Chunk, embed and index documents
    ///
    /// # Returns
    /// Number of chunks added to the index
    async fn ingest(&self, documents: &[SourceDocument]) -> Result<usize>;

    /// Store name for logging
    fn name(&self) -> &str;
}

/// A chunk returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Similarity score (inner product for normalised vectors)
    pub score: f32,
    /// Source document ID
    pub doc_id: String,
    /// Chunk text
    pub text: String,
}

impl RetrievedChunk {
    pub fn new(score: f32, doc_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            score,
            doc_id: doc_id.into(),
            text: text.into(),
        }
    }
}

/// A document handed to the store for ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document ID (file name for folder ingestion)
    pub doc_id: String,
    /// Full document text
    pub text: String,
}

impl SourceDocument {
    pub fn new(doc_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            text: text.into(),
        }
    }
}
