//! Core traits and types for the barge dialogue controller
//!
//! This crate provides foundational types used across all other crates:
//! - Transcript events and agent speaking state
//! - Retrieved knowledge chunks and source documents
//! - Collaborator traits (knowledge store, answer generator)
//! - Error types

pub mod conversation;
pub mod error;
pub mod traits;
pub mod transcript;

pub use conversation::AgentState;
pub use error::{Error, Result};
pub use transcript::TranscriptEvent;

pub use traits::{
    // Generation
    AnswerGenerator,
    GenerationOutcome,
    // Retrieval
    KnowledgeStore,
    RetrievedChunk,
    SourceDocument,
};

/// Cancellation token shared by the controller and task workers
pub use tokio_util::sync::CancellationToken;
