//! Retrieval agent
//!
//! Fetches the top chunks for a question and renders the grounded prompt
//! handed to the answer generator.

use barge_config::constants::rag;
use barge_core::{KnowledgeStore, RetrievedChunk};
use std::fmt::Write;
use std::sync::Arc;

use crate::RagError;

/// Composes knowledge store results into grounded prompts
pub struct RetrievalAgent {
    store: Arc<dyn KnowledgeStore>,
    top_k: usize,
}

impl RetrievalAgent {
    pub fn new(store: Arc<dyn KnowledgeStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }

    /// Agent retrieving the default number of chunks
    pub fn with_default_top_k(store: Arc<dyn KnowledgeStore>) -> Self {
        Self::new(store, rag::DEFAULT_TOP_K)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve chunks for a question, most relevant first
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>, RagError> {
        let mut chunks = self
            .store
            .search(question, self.top_k)
            .await
            .map_err(|e| RagError::Store(e.to_string()))?;

        chunks.truncate(self.top_k);

        tracing::debug!(
            store = self.store.name(),
            top_k = self.top_k,
            retrieved = chunks.len(),
            "Retrieved context chunks"
        );

        Ok(chunks)
    }

    /// Render the grounded prompt for a question
    pub fn build_prompt(&self, question: &str, chunks: &[RetrievedChunk]) -> String {
        build_prompt(question, chunks)
    }
}

/// Render the grounded prompt
///
/// Pure: identical inputs always produce byte-identical output.
pub fn build_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
    let mut context = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            context.push_str("\n\n");
        }
        // Writing to a String cannot fail
        let _ = write!(
            context,
            "[{} | score={:.3}] {}",
            chunk.doc_id, chunk.score, chunk.text
        );
    }

    format!(
        "You must answer using the retrieved context only.\n\
         If answer is not found, say 'I don't know'.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}
