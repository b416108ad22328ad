//! Ollama completion backend
//!
//! Streams `/api/generate` as NDJSON and checks the cancellation token
//! between chunks, so an interrupted answer stops consuming the model
//! as soon as the next chunk arrives (or immediately, if none is pending).

use async_trait::async_trait;
use barge_config::constants::{endpoints, generation};
use barge_config::GenerationConfig;
use barge_core::{AnswerGenerator, CancellationToken, GenerationOutcome, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::LlmError;

/// Ollama generator configuration
#[derive(Debug, Clone)]
pub struct OllamaGeneratorConfig {
    /// Ollama API endpoint
    pub endpoint: String,
    /// Model name
    pub model: String,
}

impl Default for OllamaGeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OLLAMA_DEFAULT.to_string(),
            model: generation::MODEL.to_string(),
        }
    }
}

impl From<&GenerationConfig> for OllamaGeneratorConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            endpoint: config.ollama_endpoint.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    /// Disable extended thinking for models like qwen3/deepseek-r1
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Streaming Ollama generator
pub struct OllamaGenerator {
    client: Client,
    config: OllamaGeneratorConfig,
}

impl OllamaGenerator {
    pub fn new(config: OllamaGeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self) -> String {
        format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'))
    }

    async fn stream_answer(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<GenerationOutcome, LlmError> {
        let request = OllamaGenerateRequest {
            model: &self.config.model,
            prompt,
            stream: true,
            think: Some(false),
        };

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(GenerationOutcome::Cancelled),
            response = self.client.post(self.api_url()).json(&request).send() => response?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error)));
        }

        let mut stream = response.bytes_stream();
        let mut pending = String::new();
        let mut answer = String::new();

        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(partial_len = answer.len(), "Ollama generation cancelled");
                    return Ok(GenerationOutcome::Cancelled);
                }
                chunk = stream.next() => chunk,
            };

            let Some(chunk) = chunk else {
                break;
            };
            pending.push_str(&String::from_utf8_lossy(&chunk?));

            // Lines may straddle network chunks; keep the unterminated tail
            while let Some(newline) = pending.find('\n') {
                let line: String = pending.drain(..=newline).collect();
                if apply_line(line.trim(), &mut answer)? {
                    return Ok(GenerationOutcome::Completed(answer));
                }
            }
        }

        if apply_line(pending.trim(), &mut answer)? {
            return Ok(GenerationOutcome::Completed(answer));
        }

        Err(LlmError::InvalidResponse(
            "Stream ended before completion".to_string(),
        ))
    }
}

/// Append one NDJSON line to the answer; returns true on the final chunk
fn apply_line(line: &str, answer: &mut String) -> std::result::Result<bool, LlmError> {
    if line.is_empty() {
        return Ok(false);
    }
    let chunk: OllamaGenerateChunk =
        serde_json::from_str(line).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
    answer.push_str(&chunk.response);
    Ok(chunk.done)
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    async fn generate(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome> {
        Ok(self.stream_answer(prompt, cancel).await?)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = GenerationConfig {
            ollama_endpoint: "http://gpu-box:11434/".to_string(),
            model: "llama3".to_string(),
            ..Default::default()
        };
        let generator = OllamaGenerator::new(OllamaGeneratorConfig::from(&settings));
        assert_eq!(generator.model(), "llama3");
        assert_eq!(generator.api_url(), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn test_apply_line_accumulates() {
        let mut answer = String::new();
        assert!(!apply_line(r#"{"response":"Par","done":false}"#, &mut answer).unwrap());
        assert!(!apply_line("", &mut answer).unwrap());
        assert!(apply_line(r#"{"response":"is","done":true}"#, &mut answer).unwrap());
        assert_eq!(answer, "Paris");
    }

    #[test]
    fn test_apply_line_rejects_garbage() {
        let mut answer = String::new();
        let err = apply_line("not json", &mut answer).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let generator = OllamaGenerator::new(OllamaGeneratorConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        let token = CancellationToken::new();
        token.cancel();

        let outcome = generator.generate("prompt", &token).await.unwrap();
        assert_eq!(outcome, GenerationOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_generation_error() {
        let generator = OllamaGenerator::new(OllamaGeneratorConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        let err = generator
            .generate("prompt", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, barge_core::Error::Generation(_)));
    }
}
