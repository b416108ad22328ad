//! Flat inner-product knowledge store
//!
//! Exact search over every indexed chunk. Vectors and chunk metadata are kept
//! in memory and, when paths are configured, mirrored to two JSON files that
//! are reloaded on `open`.

use async_trait::async_trait;
use barge_core::{KnowledgeStore, RetrievedChunk, SourceDocument};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chunker::{ChunkConfig, Chunker};
use crate::embeddings::TextEmbedder;
use crate::RagError;

/// Flat index configuration
#[derive(Debug, Clone, Default)]
pub struct FlatIndexConfig {
    /// Vector file; `None` disables persistence
    pub index_path: Option<PathBuf>,
    /// Chunk metadata file
    pub meta_path: Option<PathBuf>,
    /// Chunking applied on ingest
    pub chunk: ChunkConfig,
}

impl FlatIndexConfig {
    /// In-memory index with the given chunking
    pub fn in_memory(chunk: ChunkConfig) -> Self {
        Self {
            index_path: None,
            meta_path: None,
            chunk,
        }
    }

    fn persistence_paths(&self) -> Option<(&Path, &Path)> {
        match (&self.index_path, &self.meta_path) {
            (Some(index), Some(meta)) => Some((index.as_path(), meta.as_path())),
            _ => None,
        }
    }
}

/// Chunk metadata stored next to each vector
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkMeta {
    doc_id: String,
    text: String,
}

/// On-disk vector file
#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Default)]
struct IndexState {
    vectors: Vec<Vec<f32>>,
    meta: Vec<ChunkMeta>,
}

/// Knowledge store backed by an exact inner-product index
pub struct FlatIndexStore {
    config: FlatIndexConfig,
    chunker: Chunker,
    embedder: Arc<dyn TextEmbedder>,
    state: RwLock<IndexState>,
}

impl FlatIndexStore {
    /// Open the store, reloading persisted files when both exist
    pub fn open(config: FlatIndexConfig, embedder: Arc<dyn TextEmbedder>) -> Result<Self, RagError> {
        let state = match config.persistence_paths() {
            Some((index_path, meta_path)) if index_path.exists() && meta_path.exists() => {
                let state = load_state(index_path, meta_path, embedder.dim())?;
                tracing::info!(
                    index = %index_path.display(),
                    chunks = state.meta.len(),
                    "Loaded persisted knowledge index"
                );
                state
            },
            _ => IndexState::default(),
        };

        Ok(Self {
            chunker: Chunker::new(config.chunk),
            config,
            embedder,
            state: RwLock::new(state),
        })
    }

    /// Create an empty, non-persistent store
    pub fn in_memory(chunk: ChunkConfig, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            chunker: Chunker::new(chunk),
            config: FlatIndexConfig::in_memory(chunk),
            embedder,
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.state.read().meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rank indexed chunks against a query vector
    fn rank(&self, query: &[f32], top_k: usize) -> Vec<RetrievedChunk> {
        let state = self.state.read();

        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, dot(query, vector)))
            .collect();

        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .filter_map(|(idx, score)| {
                state
                    .meta
                    .get(idx)
                    .map(|meta| RetrievedChunk::new(score, meta.doc_id.clone(), meta.text.clone()))
            })
            .collect()
    }

    async fn search_chunks(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>, RagError> {
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        Ok(self.rank(&query_vector, top_k))
    }

    async fn ingest_documents(&self, documents: &[SourceDocument]) -> Result<usize, RagError> {
        let mut meta = Vec::new();
        for doc in documents {
            for text in self.chunker.chunk(&doc.text) {
                meta.push(ChunkMeta {
                    doc_id: doc.doc_id.clone(),
                    text,
                });
            }
        }

        if meta.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = meta.iter().map(|m| m.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != meta.len() {
            return Err(RagError::Index(format!(
                "Chunk and embedding count mismatch: {} != {}",
                meta.len(),
                vectors.len()
            )));
        }
        let dim = self.embedder.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(RagError::Index(format!(
                "Embedding dimension {} does not match index dimension {}",
                bad.len(),
                dim
            )));
        }

        let added = meta.len();
        let snapshot = {
            let mut state = self.state.write();
            state.vectors.extend(vectors);
            state.meta.extend(meta);

            match self.config.persistence_paths() {
                Some(_) => Some(serialize_state(&state, dim)?),
                None => None,
            }
        };

        if let (Some((index_json, meta_json)), Some((index_path, meta_path))) =
            (snapshot, self.config.persistence_paths())
        {
            write_file(index_path, &index_json)?;
            write_file(meta_path, &meta_json)?;
        }

        tracing::info!(
            documents = documents.len(),
            chunks = added,
            total = self.len(),
            "Ingested documents into flat index"
        );

        Ok(added)
    }
}

#[async_trait]
impl KnowledgeStore for FlatIndexStore {
    async fn search(&self, query: &str, top_k: usize) -> barge_core::Result<Vec<RetrievedChunk>> {
        Ok(self.search_chunks(query, top_k).await?)
    }

    async fn ingest(&self, documents: &[SourceDocument]) -> barge_core::Result<usize> {
        Ok(self.ingest_documents(documents).await?)
    }

    fn name(&self) -> &str {
        "flat_index"
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn serialize_state(state: &IndexState, dim: usize) -> Result<(String, String), RagError> {
    let index = PersistedIndex {
        dim,
        vectors: state.vectors.clone(),
    };
    let index_json =
        serde_json::to_string(&index).map_err(|e| RagError::Index(format!("Failed to serialize index: {}", e)))?;
    let meta_json = serde_json::to_string_pretty(&state.meta)
        .map_err(|e| RagError::Index(format!("Failed to serialize metadata: {}", e)))?;
    Ok((index_json, meta_json))
}

fn write_file(path: &Path, contents: &str) -> Result<(), RagError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RagError::Index(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
    }
    std::fs::write(path, contents)
        .map_err(|e| RagError::Index(format!("Failed to write {}: {}", path.display(), e)))
}

fn load_state(index_path: &Path, meta_path: &Path, dim: usize) -> Result<IndexState, RagError> {
    let index_json = std::fs::read_to_string(index_path)
        .map_err(|e| RagError::Index(format!("Failed to read {}: {}", index_path.display(), e)))?;
    let meta_json = std::fs::read_to_string(meta_path)
        .map_err(|e| RagError::Index(format!("Failed to read {}: {}", meta_path.display(), e)))?;

    let index: PersistedIndex = serde_json::from_str(&index_json)
        .map_err(|e| RagError::Index(format!("Invalid index file: {}", e)))?;
    let meta: Vec<ChunkMeta> = serde_json::from_str(&meta_json)
        .map_err(|e| RagError::Index(format!("Invalid metadata file: {}", e)))?;

    if index.dim != dim {
        return Err(RagError::Index(format!(
            "Persisted index dimension {} does not match embedder dimension {}",
            index.dim, dim
        )));
    }
    if index.vectors.len() != meta.len() {
        return Err(RagError::Index(format!(
            "Persisted index has {} vectors but {} metadata entries",
            index.vectors.len(),
            meta.len()
        )));
    }

    Ok(IndexState {
        vectors: index.vectors,
        meta,
    })
}
