//! Ollama Embeddings
//!
//! Uses Ollama's embedding API for generating dense vectors.

use async_trait::async_trait;
use barge_config::constants::{endpoints, rag};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embeddings::{l2_normalize, TextEmbedder};
use crate::RagError;

/// Ollama embedding configuration
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingConfig {
    /// Ollama API endpoint
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Embedding dimension
    pub embedding_dim: usize,
}

impl Default for OllamaEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OLLAMA_DEFAULT.to_string(),
            model: rag::EMBEDDING_MODEL.to_string(),
            embedding_dim: rag::EMBEDDING_DIM,
        }
    }
}

/// Request to Ollama embedding API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

/// Response from Ollama embedding API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedder
pub struct OllamaEmbedder {
    client: Client,
    config: OllamaEmbeddingConfig,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: OllamaEmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self) -> String {
        format!("{}/api/embed", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextEmbedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.config.model,
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(self.api_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "Ollama embedding failed: {} - {}",
                status, text
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to parse Ollama response: {}", e)))?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embed_response.embeddings.len()
            )));
        }

        let mut embeddings = embed_response.embeddings;
        for embedding in &mut embeddings {
            if embedding.len() != self.config.embedding_dim {
                return Err(RagError::Embedding(format!(
                    "Model {} returned dimension {}, expected {}",
                    self.config.model,
                    embedding.len(),
                    self.config.embedding_dim
                )));
            }
            l2_normalize(embedding);
        }

        Ok(embeddings)
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = OllamaEmbeddingConfig::default();
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.embedding_dim, 384);
    }

    #[test]
    fn test_api_url_trims_slash() {
        let embedder = OllamaEmbedder::new(OllamaEmbeddingConfig {
            endpoint: "http://ollama:11434/".to_string(),
            ..Default::default()
        });
        assert_eq!(embedder.api_url(), "http://ollama:11434/api/embed");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_embedding_error() {
        let embedder = OllamaEmbedder::new(OllamaEmbeddingConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        let err = embedder.embed_batch(&["hello"]).await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let embedder = OllamaEmbedder::new(OllamaEmbeddingConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
