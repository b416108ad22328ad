//! Configuration management for the barge dialogue controller
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (BARGE_ prefix, `__` separator)
//! - Runtime overrides

pub mod constants;
pub mod dialogue;
pub mod settings;

pub use dialogue::DialogueConfig;
pub use settings::{
    load_settings, EmbedderKind, GenerationBackend, GenerationConfig, ObservabilityConfig,
    RagConfig, Settings, StoreBackend,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(path) => ConfigError::FileNotFound(path),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
