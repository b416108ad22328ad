//! Component wiring from settings

use barge_agent::DialogueController;
use barge_config::{EmbedderKind, GenerationBackend, GenerationConfig, RagConfig, Settings, StoreBackend};
use barge_core::{AnswerGenerator, KnowledgeStore};
use barge_llm::{OllamaGenerator, OllamaGeneratorConfig, PacedConfig, PacedGenerator};
use barge_rag::{
    ChunkConfig, EmbeddingConfig, FlatIndexConfig, FlatIndexStore, HashEmbedder, KnowledgeLoader,
    OllamaEmbedder, OllamaEmbeddingConfig, RagError, RetrievalAgent, TextEmbedder,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn chunk_config(config: &RagConfig) -> ChunkConfig {
    ChunkConfig {
        chunk_size: config.chunk_size,
        overlap: config.chunk_overlap,
    }
}

/// Build the configured text embedder
pub fn build_embedder(config: &RagConfig) -> Arc<dyn TextEmbedder> {
    match config.embedder {
        EmbedderKind::Hash => Arc::new(HashEmbedder::new(EmbeddingConfig {
            embedding_dim: config.embedding_dim,
            normalize: true,
        })),
        EmbedderKind::Ollama => Arc::new(OllamaEmbedder::new(OllamaEmbeddingConfig {
            endpoint: config.ollama_endpoint.clone(),
            model: config.embedding_model.clone(),
            embedding_dim: config.embedding_dim,
        })),
    }
}

/// Open the configured knowledge store and populate it if empty
///
/// The knowledge folder is only ingested into an empty store, so a persisted
/// index is not duplicated on restart.
pub async fn build_store(
    config: &RagConfig,
    embedder: Arc<dyn TextEmbedder>,
) -> Result<Arc<dyn KnowledgeStore>, RagError> {
    let knowledge_dir = Path::new(&config.knowledge_dir);

    match config.backend {
        StoreBackend::Flat => {
            let store = FlatIndexStore::open(
                FlatIndexConfig {
                    index_path: config.index_path.as_ref().map(PathBuf::from),
                    meta_path: config.meta_path.as_ref().map(PathBuf::from),
                    chunk: chunk_config(config),
                },
                embedder,
            )?;
            if store.is_empty() {
                KnowledgeLoader::ingest_folder(&store, knowledge_dir).await?;
            } else {
                tracing::info!(chunks = store.len(), "Using persisted knowledge index");
            }
            Ok(Arc::new(store))
        },
        StoreBackend::Qdrant => build_qdrant_store(config, embedder, knowledge_dir).await,
    }
}

#[cfg(feature = "qdrant")]
async fn build_qdrant_store(
    config: &RagConfig,
    embedder: Arc<dyn TextEmbedder>,
    knowledge_dir: &Path,
) -> Result<Arc<dyn KnowledgeStore>, RagError> {
    use barge_rag::{QdrantKnowledgeStore, QdrantStoreConfig};

    let store = QdrantKnowledgeStore::connect(
        QdrantStoreConfig {
            endpoint: config.qdrant_endpoint.clone(),
            collection: config.qdrant_collection.clone(),
            chunk: chunk_config(config),
        },
        embedder,
    )
    .await?;

    let points = store.points_count().await?;
    if points == 0 {
        KnowledgeLoader::ingest_folder(&store, knowledge_dir).await?;
    } else {
        tracing::info!(points, "Using existing Qdrant collection");
    }
    Ok(Arc::new(store))
}

#[cfg(not(feature = "qdrant"))]
async fn build_qdrant_store(
    _config: &RagConfig,
    _embedder: Arc<dyn TextEmbedder>,
    _knowledge_dir: &Path,
) -> Result<Arc<dyn KnowledgeStore>, RagError> {
    Err(RagError::Connection(
        "Qdrant backend requested but barge was built without the `qdrant` feature".to_string(),
    ))
}

/// Build the configured answer generator
pub fn build_generator(config: &GenerationConfig) -> Arc<dyn AnswerGenerator> {
    match config.backend {
        GenerationBackend::Paced => Arc::new(PacedGenerator::new(PacedConfig::from(config))),
        GenerationBackend::Ollama => {
            Arc::new(OllamaGenerator::new(OllamaGeneratorConfig::from(config)))
        },
    }
}

/// Wire store, retriever, generator and controller
pub async fn build_controller(settings: &Settings) -> Result<DialogueController, RagError> {
    let embedder = build_embedder(&settings.rag);
    let store = build_store(&settings.rag, embedder).await?;
    let generator = build_generator(&settings.generation);

    tracing::info!(
        store = store.name(),
        generator = generator.name(),
        top_k = settings.rag.top_k,
        cancel_superseded = settings.dialogue.cancel_superseded,
        "Dialogue controller ready"
    );

    let retriever = Arc::new(RetrievalAgent::new(store, settings.rag.top_k));
    Ok(DialogueController::new(&settings.dialogue, retriever, generator))
}
