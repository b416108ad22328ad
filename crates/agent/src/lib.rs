//! Turn-taking dialogue controller
//!
//! Features:
//! - Backchannel / interrupt / knowledge-query classification
//! - Cancellable retrieval + generation tasks with cooperative checkpoints
//! - Single-owner controller emitting speech effects over a broadcast channel
//! - Task and turn counters via the `metrics` facade

pub mod classifier;
pub mod controller;
pub mod metrics;
pub mod task;

pub use classifier::TurnClassifier;
pub use controller::{DialogueController, DialogueEffect, TurnDecision};
pub use task::{CancellableTask, TaskCheckpoint, TaskOutcome};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Task runtime error: {0}")]
    Runtime(String),
}

impl AgentError {
    /// Pipeline stage label used in logs and metrics
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Retrieval(_) => "retrieval",
            Self::Generation(_) => "generation",
            Self::Runtime(_) => "runtime",
        }
    }
}

impl From<AgentError> for barge_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Retrieval(msg) => barge_core::Error::Rag(msg),
            other => barge_core::Error::Generation(other.to_string()),
        }
    }
}
