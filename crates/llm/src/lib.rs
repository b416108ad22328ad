//! Answer generation backends
//!
//! Features:
//! - Paced stand-in generator with cancellation checkpoints per time slice
//! - Streaming Ollama completion, cancellable between streamed chunks

pub mod ollama;
pub mod paced;

pub use ollama::{OllamaGenerator, OllamaGeneratorConfig};
pub use paced::{PacedConfig, PacedGenerator};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<LlmError> for barge_core::Error {
    fn from(err: LlmError) -> Self {
        barge_core::Error::Generation(err.to_string())
    }
}
