//! Qdrant-backed knowledge store
//!
//! Same contract as the flat index, with vectors held in a Qdrant
//! collection using dot-product distance over normalized embeddings.

use async_trait::async_trait;
use barge_config::constants::{endpoints, rag};
use barge_core::{KnowledgeStore, RetrievedChunk, SourceDocument};
use qdrant_client::{
    qdrant::{
        value::Kind, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
        UpsertPointsBuilder, VectorParamsBuilder,
    },
    Qdrant,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::chunker::{ChunkConfig, Chunker};
use crate::embeddings::TextEmbedder;
use crate::RagError;

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantStoreConfig {
    /// Qdrant gRPC endpoint
    pub endpoint: String,
    /// Collection name
    pub collection: String,
    /// Chunk window used on ingest
    pub chunk: ChunkConfig,
}

impl Default for QdrantStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::QDRANT_DEFAULT.to_string(),
            collection: rag::QDRANT_COLLECTION.to_string(),
            chunk: ChunkConfig::default(),
        }
    }
}

/// Knowledge store on a Qdrant collection
///
/// Point IDs are sequential integers continuing from the collection's
/// current point count, so a single writer is assumed.
pub struct QdrantKnowledgeStore {
    client: Qdrant,
    config: QdrantStoreConfig,
    chunker: Chunker,
    embedder: Arc<dyn TextEmbedder>,
}

impl QdrantKnowledgeStore {
    /// Connect and make sure the collection exists
    pub async fn connect(
        config: QdrantStoreConfig,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Result<Self, RagError> {
        let client = Qdrant::from_url(&config.endpoint)
            .build()
            .map_err(|e| RagError::Connection(e.to_string()))?;

        let store = Self {
            client,
            chunker: Chunker::new(config.chunk),
            config,
            embedder,
        };
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(&self.config.collection)
            .await
            .map_err(|e| RagError::Store(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.config.collection).vectors_config(
                        VectorParamsBuilder::new(self.embedder.dim() as u64, Distance::Dot),
                    ),
                )
                .await
                .map_err(|e| RagError::Store(e.to_string()))?;

            tracing::info!(
                collection = %self.config.collection,
                dim = self.embedder.dim(),
                "Created Qdrant collection"
            );
        }

        Ok(())
    }

    /// Points currently stored in the collection
    pub async fn points_count(&self) -> Result<u64, RagError> {
        let info = self
            .client
            .collection_info(&self.config.collection)
            .await
            .map_err(|e| RagError::Store(e.to_string()))?;

        Ok(info
            .result
            .map(|r| r.points_count.unwrap_or(0))
            .unwrap_or(0))
    }

    async fn ingest_chunks(&self, documents: &[SourceDocument]) -> Result<usize, RagError> {
        let mut entries: Vec<(String, String)> = Vec::new();
        for doc in documents {
            for chunk in self.chunker.chunk(&doc.text) {
                entries.push((doc.doc_id.clone(), chunk));
            }
        }
        if entries.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = entries.iter().map(|(_, text)| text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != entries.len() {
            return Err(RagError::Embedding(format!(
                "Expected {} embeddings, got {}",
                entries.len(),
                vectors.len()
            )));
        }

        let offset = self.points_count().await?;
        let points: Vec<PointStruct> = entries
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, ((doc_id, text), vector))| {
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("doc_id".to_string(), doc_id.clone().into());
                payload.insert("text".to_string(), text.clone().into());
                PointStruct::new(offset + i as u64, vector, payload)
            })
            .collect();

        let count = points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.config.collection, points).wait(true))
            .await
            .map_err(|e| RagError::Store(e.to_string()))?;

        tracing::info!(
            collection = %self.config.collection,
            documents = documents.len(),
            chunks = count,
            "Ingested documents into Qdrant"
        );

        Ok(count)
    }

    async fn search_chunks(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.config.collection, vector, top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| RagError::Search(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .map(|point| {
                let mut doc_id = String::new();
                let mut text = String::new();
                for (key, value) in point.payload {
                    if let Some(Kind::StringValue(s)) = value.kind {
                        match key.as_str() {
                            "doc_id" => doc_id = s,
                            "text" => text = s,
                            _ => {},
                        }
                    }
                }
                RetrievedChunk::new(point.score, doc_id, text)
            })
            .collect())
    }
}

#[async_trait]
impl KnowledgeStore for QdrantKnowledgeStore {
    async fn search(&self, query: &str, top_k: usize) -> barge_core::Result<Vec<RetrievedChunk>> {
        Ok(self.search_chunks(query, top_k).await?)
    }

    async fn ingest(&self, documents: &[SourceDocument]) -> barge_core::Result<usize> {
        Ok(self.ingest_chunks(documents).await?)
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = QdrantStoreConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:6334");
        assert_eq!(config.collection, "barge_knowledge");
        assert_eq!(config.chunk, ChunkConfig::default());
    }
}
