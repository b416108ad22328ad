//! Transcript events delivered by the speech pipeline

use serde::{Deserialize, Serialize};

/// A transcription update from STT
///
/// Partial hypotheses arrive with `is_final = false` and are superseded by
/// later events; only final transcripts drive turn decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Transcribed text
    pub text: String,
    /// Whether this is the final hypothesis for the utterance
    #[serde(default)]
    pub is_final: bool,
}

impl TranscriptEvent {
    /// Create a final transcript
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// Create a partial (interim) transcript
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    /// Text with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// True if the text is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let event = TranscriptEvent::final_text("what is rust?");
        assert!(event.is_final);
        assert_eq!(event.text, "what is rust?");

        let event = TranscriptEvent::partial("what is");
        assert!(!event.is_final);
    }

    #[test]
    fn test_blank_detection() {
        assert!(TranscriptEvent::final_text("   ").is_blank());
        assert!(TranscriptEvent::final_text("").is_blank());
        assert!(!TranscriptEvent::final_text(" ok ").is_blank());
        assert_eq!(TranscriptEvent::final_text(" ok ").trimmed(), "ok");
    }

    #[test]
    fn test_is_final_defaults_to_false() {
        let event: TranscriptEvent = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert!(!event.is_final);
    }
}
