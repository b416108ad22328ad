//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, generation, rag};
use crate::{ConfigError, DialogueConfig};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Turn-taking vocabularies and policies
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Knowledge store and retrieval
    #[serde(default)]
    pub rag: RagConfig,

    /// Answer generation
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dialogue.validate()?;
        self.validate_rag()?;
        self.validate_generation()?;
        Ok(())
    }

    fn validate_rag(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if rag.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.top_k".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if rag.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.chunk_size".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if rag.chunk_overlap >= rag.chunk_size {
            return Err(ConfigError::InvalidValue {
                field: "rag.chunk_overlap".to_string(),
                message: format!(
                    "Must be smaller than chunk_size ({}), got {}",
                    rag.chunk_size, rag.chunk_overlap
                ),
            });
        }

        if rag.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.embedding_dim".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if rag.index_path.is_some() != rag.meta_path.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "rag.meta_path".to_string(),
                message: "index_path and meta_path must be set together".to_string(),
            });
        }

        Ok(())
    }

    fn validate_generation(&self) -> Result<(), ConfigError> {
        if self.generation.slices == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.slices".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Embedding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Deterministic hash embedding (offline, no model)
    #[default]
    Hash,
    /// Ollama embedding endpoint
    Ollama,
}

/// Knowledge store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process flat inner-product index
    #[default]
    Flat,
    /// Qdrant collection
    Qdrant,
}

/// RAG configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Chunk window (characters)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between chunk windows (characters)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Directory ingested at startup
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: String,

    /// Persisted vectors (flat store); `None` keeps the index in memory only
    #[serde(default = "default_index_path")]
    pub index_path: Option<String>,

    /// Persisted chunk metadata (flat store)
    #[serde(default = "default_meta_path")]
    pub meta_path: Option<String>,

    /// Embedding backend
    #[serde(default)]
    pub embedder: EmbedderKind,

    /// Embedding dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Ollama endpoint for embeddings
    #[serde(default = "default_ollama_endpoint")]
    pub ollama_endpoint: String,

    /// Ollama embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Store backend
    #[serde(default)]
    pub backend: StoreBackend,

    /// Qdrant endpoint
    #[serde(default = "default_qdrant_endpoint")]
    pub qdrant_endpoint: String,

    /// Qdrant collection name
    #[serde(default = "default_qdrant_collection")]
    pub qdrant_collection: String,
}

fn default_top_k() -> usize {
    rag::DEFAULT_TOP_K
}

fn default_chunk_size() -> usize {
    rag::CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    rag::CHUNK_OVERLAP
}

fn default_knowledge_dir() -> String {
    rag::KNOWLEDGE_DIR.to_string()
}

fn default_index_path() -> Option<String> {
    Some(rag::INDEX_PATH.to_string())
}

fn default_meta_path() -> Option<String> {
    Some(rag::META_PATH.to_string())
}

fn default_embedding_dim() -> usize {
    rag::EMBEDDING_DIM
}

fn default_ollama_endpoint() -> String {
    endpoints::OLLAMA_DEFAULT.to_string()
}

fn default_embedding_model() -> String {
    rag::EMBEDDING_MODEL.to_string()
}

fn default_qdrant_endpoint() -> String {
    endpoints::QDRANT_DEFAULT.to_string()
}

fn default_qdrant_collection() -> String {
    rag::QDRANT_COLLECTION.to_string()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            knowledge_dir: default_knowledge_dir(),
            index_path: default_index_path(),
            meta_path: default_meta_path(),
            embedder: EmbedderKind::default(),
            embedding_dim: default_embedding_dim(),
            ollama_endpoint: default_ollama_endpoint(),
            embedding_model: default_embedding_model(),
            backend: StoreBackend::default(),
            qdrant_endpoint: default_qdrant_endpoint(),
            qdrant_collection: default_qdrant_collection(),
        }
    }
}

/// Generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    /// Time-sliced stand-in returning a fixed answer
    #[default]
    Paced,
    /// Streaming Ollama completion
    Ollama,
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub backend: GenerationBackend,

    /// Cancellation checks during paced generation
    #[serde(default = "default_slices")]
    pub slices: u32,

    /// Duration of each paced slice (ms)
    #[serde(default = "default_slice_ms")]
    pub slice_ms: u64,

    /// Answer returned by the paced generator
    #[serde(default = "default_answer_text")]
    pub answer_text: String,

    /// Ollama endpoint for generation
    #[serde(default = "default_ollama_endpoint")]
    pub ollama_endpoint: String,

    /// Ollama model
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_slices() -> u32 {
    generation::SLICES
}

fn default_slice_ms() -> u64 {
    generation::SLICE_MS
}

fn default_answer_text() -> String {
    generation::ANSWER_TEXT.to_string()
}

fn default_model() -> String {
    generation::MODEL.to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::default(),
            slices: default_slices(),
            slice_ms: default_slice_ms(),
            answer_text: default_answer_text(),
            ollama_endpoint: default_ollama_endpoint(),
            model: default_model(),
        }
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env} > config/default > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("BARGE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.rag.top_k, 3);
        assert_eq!(settings.rag.chunk_size, 350);
        assert_eq!(settings.rag.chunk_overlap, 70);
        assert_eq!(settings.generation.slices, 5);
        assert_eq!(settings.generation.slice_ms, 200);
        assert_eq!(settings.rag.backend, StoreBackend::Flat);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rag_validation() {
        let mut settings = Settings::default();

        settings.rag.top_k = 0;
        assert!(settings.validate_rag().is_err());
        settings.rag.top_k = 5;
        assert!(settings.validate_rag().is_ok());

        settings.rag.chunk_overlap = settings.rag.chunk_size;
        assert!(settings.validate_rag().is_err());
        settings.rag.chunk_overlap = 10;

        settings.rag.meta_path = None;
        assert!(settings.validate_rag().is_err());
        settings.rag.index_path = None;
        assert!(settings.validate_rag().is_ok());
    }

    #[test]
    fn test_generation_validation() {
        let mut settings = Settings::default();
        settings.generation.slices = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_backend_names() {
        let backend: GenerationBackend = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(backend, GenerationBackend::Ollama);
        let embedder: EmbedderKind = serde_json::from_str("\"hash\"").unwrap();
        assert_eq!(embedder, EmbedderKind::Hash);
    }

    #[test]
    fn test_load_settings_without_files() {
        // No config/ directory in the crate root: every source is optional
        let settings = load_settings(Some("does-not-exist")).unwrap();
        assert_eq!(settings.rag.top_k, rag::DEFAULT_TOP_K);
    }
}
