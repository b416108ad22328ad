//! Text Embeddings
//!
//! Generates dense embeddings for semantic search.

use async_trait::async_trait;
use barge_config::constants::rag;

use crate::RagError;

/// Text embedder interface
///
/// Vectors are expected to be L2-normalised so inner product equals cosine
/// similarity.
#[async_trait]
pub trait TextEmbedder: Send + Sync + 'static {
    /// Embed multiple texts, one vector per input
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embedding dimension
    fn dim(&self) -> usize;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("No embedding returned".to_string()))
    }
}

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding dimension
    pub embedding_dim: usize,
    /// Normalize embeddings
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: rag::EMBEDDING_DIM,
            normalize: true,
        }
    }
}

/// Scale a vector to unit length in place (zero vectors are left as is)
pub fn l2_normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}

/// Hash-based embedder (no model required)
///
/// Deterministic, so identical texts always map to identical vectors.
pub struct HashEmbedder {
    config: EmbeddingConfig,
}

impl HashEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    /// Generate a simple hash-based embedding
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim.max(1);
        let mut embedding = vec![0.0f32; dim];

        for (i, c) in text.to_lowercase().chars().enumerate() {
            let idx = (c as usize + i) % dim;
            embedding[idx] += 1.0;
        }

        if self.config.normalize {
            l2_normalize(&mut embedding);
        }

        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EmbeddingConfig::default())
    }
}

#[async_trait]
impl TextEmbedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim.max(1)
    }
}
