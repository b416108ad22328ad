//! Collaborator traits for the dialogue controller
//!
//! The controller only depends on these contracts, so backends can be
//! swapped without touching turn-taking logic and tests can use mocks.
//!
//! ```text
//! Retrieval:
//!   - KnowledgeStore: embed + similarity search + ingest
//!
//! Generation:
//!   - AnswerGenerator: prompt → answer, interruptible via cancellation token
//! ```

mod llm;
mod retriever;

pub use llm::{AnswerGenerator, GenerationOutcome};
pub use retriever::{KnowledgeStore, RetrievedChunk, SourceDocument};
