//! Error types shared across crates

use thiserror::Error;

/// Core error type
///
/// Crate-specific errors (`RagError`, `LlmError`, ...) convert into this
/// so collaborator traits can share a single result type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Retrieval error: {0}")]
    Rag(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;
