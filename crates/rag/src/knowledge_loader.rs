//! Knowledge Base Loader
//!
//! Collects documents from a knowledge folder and ingests them into a
//! `KnowledgeStore` at startup. Plain `.txt` files become one document each
//! (document ID = file name); `.yaml`/`.yml`/`.json` files carry a
//! `documents` list.

use barge_core::{KnowledgeStore, SourceDocument};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::RagError;

/// Knowledge document format for YAML/JSON files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Unique document ID
    pub id: String,
    /// Document content (will be chunked and embedded)
    pub content: String,
}

/// Knowledge base file format
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeFile {
    /// Version for format compatibility
    #[serde(default)]
    pub version: Option<String>,
    /// List of documents
    pub documents: Vec<KnowledgeDocument>,
}

/// Knowledge loader for populating a knowledge store
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    /// Ingest every supported file in `knowledge_dir`
    ///
    /// # Returns
    /// Number of chunks indexed (0 when the folder is missing or empty)
    pub async fn ingest_folder(
        store: &dyn KnowledgeStore,
        knowledge_dir: &Path,
    ) -> Result<usize, RagError> {
        let documents = Self::collect_documents(knowledge_dir)?;
        if documents.is_empty() {
            return Ok(0);
        }

        let chunks = store
            .ingest(&documents)
            .await
            .map_err(|e| RagError::Store(e.to_string()))?;

        tracing::info!(
            directory = %knowledge_dir.display(),
            documents = documents.len(),
            chunks,
            store = store.name(),
            "Knowledge base loading complete"
        );

        Ok(chunks)
    }

    /// Read documents from a directory, ordered by file name
    pub fn collect_documents(knowledge_dir: &Path) -> Result<Vec<SourceDocument>, RagError> {
        if !knowledge_dir.exists() {
            tracing::warn!(
                path = %knowledge_dir.display(),
                "Knowledge directory does not exist"
            );
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(knowledge_dir)
            .map_err(|e| RagError::Index(format!("Failed to read directory: {}", e)))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| RagError::Index(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            match extension {
                "txt" => documents.push(Self::load_text_file(&path)?),
                "yaml" | "yml" | "json" => match Self::load_knowledge_file(&path) {
                    Ok(docs) => documents.extend(docs),
                    Err(e) => {
                        tracing::error!(
                            file = %path.display(),
                            error = %e,
                            "Failed to load knowledge file"
                        );
                    },
                },
                _ => continue,
            }
        }

        Ok(documents)
    }

    fn load_text_file(path: &Path) -> Result<SourceDocument, RagError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RagError::Index(format!("Failed to read {}: {}", path.display(), e)))?;
        let doc_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(SourceDocument::new(doc_id, text))
    }

    fn load_knowledge_file(path: &Path) -> Result<Vec<SourceDocument>, RagError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RagError::Index(format!("Failed to read file: {}", e)))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let knowledge: KnowledgeFile = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| RagError::Index(format!("JSON parse error: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| RagError::Index(format!("YAML parse error: {}", e)))?,
            _ => {
                return Err(RagError::Index(format!(
                    "Unsupported file type: {}",
                    extension
                )))
            },
        };

        Ok(knowledge
            .documents
            .into_iter()
            .map(|doc| SourceDocument::new(doc.id, doc.content))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkConfig;
    use crate::embeddings::HashEmbedder;
    use crate::vector_store::FlatIndexStore;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let docs = KnowledgeLoader::collect_documents(&dir.path().join("nope")).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_collects_text_and_yaml_sorted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "Bravo document").unwrap();
        std::fs::write(dir.path().join("a.txt"), "Alpha document").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        std::fs::write(
            dir.path().join("faq.yaml"),
            "version: \"1.0\"\ndocuments:\n  - id: faq_001\n    content: Opening hours are nine to five.\n",
        )
        .unwrap();

        let docs = KnowledgeLoader::collect_documents(dir.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "b.txt", "faq_001"]);
        assert_eq!(docs[0].text, "Alpha document");
    }

    #[test]
    fn test_malformed_knowledge_file_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("ok.txt"), "still loaded").unwrap();

        let docs = KnowledgeLoader::collect_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].doc_id, "ok.txt");
    }

    #[tokio::test]
    async fn test_ingest_folder_into_store() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("france.txt"), "Paris is the capital of France.").unwrap();

        let store = FlatIndexStore::in_memory(ChunkConfig::default(), Arc::new(HashEmbedder::default()));
        let chunks = KnowledgeLoader::ingest_folder(&store, dir.path()).await.unwrap();
        assert_eq!(chunks, 1);
        assert_eq!(store.len(), 1);
    }
}
