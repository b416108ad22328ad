//! Fixed-window text chunking
//!
//! Documents are flattened to a single line and cut into overlapping windows
//! measured in grapheme clusters, so multi-byte text is never split inside a
//! character.

use barge_config::constants::rag;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Chunk window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Window length in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive windows
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: rag::CHUNK_SIZE,
            overlap: rag::CHUNK_OVERLAP,
        }
    }
}

/// Splits documents into overlapping windows
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Distance between window starts (never zero)
    fn stride(&self) -> usize {
        self.config
            .chunk_size
            .saturating_sub(self.config.overlap)
            .max(1)
    }

    /// Split text into windows
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let flattened = text.replace('\n', " ");
        let graphemes: Vec<&str> = flattened.graphemes(true).collect();
        let size = self.config.chunk_size.max(1);
        let stride = self.stride();

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < graphemes.len() {
            let end = (start + size).min(graphemes.len());
            chunks.push(graphemes[start..end].concat());
            start += stride;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_text(len: usize) -> String {
        (0..len).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(Chunker::default().chunk("").is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = Chunker::default().chunk("Paris is the capital of France.");
        assert_eq!(chunks, vec!["Paris is the capital of France.".to_string()]);
    }

    #[test]
    fn test_windows_overlap() {
        let text = numbered_text(400);
        let chunks = Chunker::default().chunk(&text);

        // Windows start at 0 and 280
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 350);
        assert_eq!(chunks[1].len(), 120);
        assert_eq!(&chunks[0][280..], &chunks[1][..70]);
    }

    #[test]
    fn test_newlines_flattened() {
        let chunks = Chunker::default().chunk("line one\nline two");
        assert_eq!(chunks[0], "line one line two");
    }

    #[test]
    fn test_multibyte_text_not_split() {
        let chunker = Chunker::new(ChunkConfig {
            chunk_size: 3,
            overlap: 1,
        });
        let chunks = chunker.chunk("héllo");
        assert_eq!(chunks, vec!["hél", "llo", "o"]);
    }

    #[test]
    fn test_overlap_not_smaller_than_window_still_advances() {
        let chunker = Chunker::new(ChunkConfig {
            chunk_size: 2,
            overlap: 5,
        });
        assert_eq!(chunker.chunk("abc"), vec!["ab", "bc", "c"]);
    }
}
