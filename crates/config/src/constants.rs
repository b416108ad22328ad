//! Centralized constants and default values
//!
//! Single source of truth for vocabularies and defaults shared by the config
//! defaults and the crates that fall back to them.

/// Turn-taking vocabularies
pub mod vocabulary {
    /// Acknowledgements that never interrupt the agent (exact match)
    pub const BACKCHANNEL: &[&str] = &["yeah", "ok", "okay", "hmm", "uh-huh", "right", "mm", "ah"];

    /// Phrases that stop agent speech (substring match)
    pub const INTERRUPT: &[&str] = &["stop", "wait", "no", "hold on", "pause"];

    /// First words that mark a knowledge query
    pub const KNOWLEDGE_HINTS: &[&str] = &[
        "what", "who", "when", "where", "why", "how", "explain", "describe",
    ];
}

/// Retrieval defaults
pub mod rag {
    /// Chunks passed to the prompt
    pub const DEFAULT_TOP_K: usize = 3;

    /// Chunk window in characters
    pub const CHUNK_SIZE: usize = 350;

    /// Overlap between consecutive chunk windows
    pub const CHUNK_OVERLAP: usize = 70;

    /// Embedding dimension (all-MiniLM-L6-v2 sized)
    pub const EMBEDDING_DIM: usize = 384;

    pub const KNOWLEDGE_DIR: &str = "data/kb";
    pub const INDEX_PATH: &str = "rag/index.json";
    pub const META_PATH: &str = "rag/meta.json";

    pub const EMBEDDING_MODEL: &str = "all-minilm";
    pub const QDRANT_COLLECTION: &str = "barge_knowledge";
}

/// Generation defaults
pub mod generation {
    /// Cancellation checks during paced generation
    pub const SLICES: u32 = 5;

    /// Duration of one paced generation slice
    pub const SLICE_MS: u64 = 200;

    pub const ANSWER_TEXT: &str = "Here is the answer grounded in context.";

    pub const MODEL: &str = "qwen3:4b-instruct-2507-q4_K_M";
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// Ollama endpoint for embeddings and generation
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// Qdrant vector store endpoint
    pub const QDRANT_DEFAULT: &str = "http://127.0.0.1:6334";
}
