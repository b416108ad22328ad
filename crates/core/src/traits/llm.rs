//! Answer generation traits

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::Result;

/// Interruptible answer generator
///
/// Implementations:
/// - `PacedGenerator` - time-sliced stand-in with a fixed answer
/// - `OllamaGenerator` - streaming Ollama completion
///
/// Implementations must observe `cancel` at least between units of work
/// (time slices, streamed tokens) and return `GenerationOutcome::Cancelled`
/// once it fires, without producing a partial answer.
#[async_trait]
pub trait AnswerGenerator: Send + Sync + 'static {
    /// Generate an answer for a grounded prompt
    async fn generate(&self, prompt: &str, cancel: &CancellationToken)
        -> Result<GenerationOutcome>;

    /// Generator name for logging
    fn name(&self) -> &str;
}

/// Result of a generation attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Full answer text
    Completed(String),
    /// Generation stopped because the token was cancelled
    Cancelled,
}

impl GenerationOutcome {
    /// Answer text, if generation completed
    pub fn into_answer(self) -> Option<String> {
        match self {
            Self::Completed(text) => Some(text),
            Self::Cancelled => None,
        }
    }
}
