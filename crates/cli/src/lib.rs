//! Pipeline driver for the barge dialogue controller
//!
//! Reads speech-pipeline events as JSON lines, feeds them to a
//! `DialogueController` and reports its effects.

pub mod bootstrap;
pub mod events;

pub use bootstrap::{build_controller, build_embedder, build_generator, build_store};
pub use events::{apply_event, parse_event, PipelineEvent};

use thiserror::Error;

/// Start-up errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] barge_config::ConfigError),

    #[error("Knowledge store error: {0}")]
    Rag(#[from] barge_rag::RagError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
