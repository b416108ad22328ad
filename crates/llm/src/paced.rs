//! Paced stand-in generator
//!
//! Simulates a slow model: the work is split into fixed time slices and the
//! cancellation token is checked before each one. A cancel that lands inside
//! a slice wakes the generator immediately instead of waiting the slice out.

use async_trait::async_trait;
use barge_config::constants::generation;
use barge_config::GenerationConfig;
use barge_core::{AnswerGenerator, CancellationToken, GenerationOutcome, Result};
use std::time::Duration;

/// Paced generator configuration
#[derive(Debug, Clone)]
pub struct PacedConfig {
    /// Number of slices (each preceded by a cancellation check)
    pub slices: u32,
    /// Length of one slice
    pub slice: Duration,
    /// Text returned when all slices complete
    pub answer: String,
}

impl Default for PacedConfig {
    fn default() -> Self {
        Self {
            slices: generation::SLICES,
            slice: Duration::from_millis(generation::SLICE_MS),
            answer: generation::ANSWER_TEXT.to_string(),
        }
    }
}

impl From<&GenerationConfig> for PacedConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            slices: config.slices,
            slice: Duration::from_millis(config.slice_ms),
            answer: config.answer_text.clone(),
        }
    }
}

/// Generator returning a fixed answer after a paced delay
#[derive(Debug, Clone, Default)]
pub struct PacedGenerator {
    config: PacedConfig,
}

impl PacedGenerator {
    pub fn new(config: PacedConfig) -> Self {
        Self { config }
    }

    /// Total time an uninterrupted generation takes
    pub fn total_duration(&self) -> Duration {
        self.config.slice * self.config.slices
    }
}

#[async_trait]
impl AnswerGenerator for PacedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome> {
        for slice in 0..self.config.slices {
            if cancel.is_cancelled() {
                tracing::debug!(slice, "Generation cancelled between slices");
                return Ok(GenerationOutcome::Cancelled);
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(slice, "Generation cancelled mid-slice");
                    return Ok(GenerationOutcome::Cancelled);
                }
                () = tokio::time::sleep(self.config.slice) => {}
            }
        }

        Ok(GenerationOutcome::Completed(self.config.answer.clone()))
    }

    fn name(&self) -> &str {
        "paced"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_completes_with_fixed_answer() {
        let generator = PacedGenerator::default();
        let token = CancellationToken::new();
        let started = Instant::now();

        let outcome = generator.generate("prompt", &token).await.unwrap();

        assert_eq!(
            outcome,
            GenerationOutcome::Completed("Here is the answer grounded in context.".to_string())
        );
        assert_eq!(started.elapsed(), Duration::from_millis(1000));
        assert_eq!(generator.total_duration(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_returns_immediately() {
        let generator = PacedGenerator::default();
        let token = CancellationToken::new();
        token.cancel();
        let started = Instant::now();

        let outcome = generator.generate("prompt", &token).await.unwrap();

        assert_eq!(outcome, GenerationOutcome::Cancelled);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_slice_stops_early() {
        let generator = PacedGenerator::default();
        let token = CancellationToken::new();
        let canceller = token.clone();
        let started = Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            canceller.cancel();
        });

        let outcome = generator.generate("prompt", &token).await.unwrap();

        assert_eq!(outcome, GenerationOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = GenerationConfig {
            slices: 2,
            slice_ms: 10,
            answer_text: "done".to_string(),
            ..Default::default()
        };
        let config = PacedConfig::from(&settings);
        assert_eq!(config.slices, 2);
        assert_eq!(config.slice, Duration::from_millis(10));
        assert_eq!(config.answer, "done");
    }
}
