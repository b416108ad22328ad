//! Turn-taking configuration

use serde::{Deserialize, Serialize};

use crate::constants::vocabulary;
use crate::ConfigError;

/// Vocabularies and policies for the dialogue controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Whole-utterance acknowledgements ignored while the agent speaks
    #[serde(default = "default_backchannel")]
    pub backchannel: Vec<String>,

    /// Phrases that stop agent speech when found anywhere in the utterance
    #[serde(default = "default_interrupt")]
    pub interrupt: Vec<String>,

    /// Leading words that mark a knowledge query
    #[serde(default = "default_knowledge_hints")]
    pub knowledge_hints: Vec<String>,

    /// Cancel the current retrieval task when a new knowledge query replaces it
    #[serde(default = "default_true")]
    pub cancel_superseded: bool,
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_backchannel() -> Vec<String> {
    to_owned(vocabulary::BACKCHANNEL)
}

fn default_interrupt() -> Vec<String> {
    to_owned(vocabulary::INTERRUPT)
}

fn default_knowledge_hints() -> Vec<String> {
    to_owned(vocabulary::KNOWLEDGE_HINTS)
}

fn default_true() -> bool {
    true
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            backchannel: default_backchannel(),
            interrupt: default_interrupt(),
            knowledge_hints: default_knowledge_hints(),
            cancel_superseded: true,
        }
    }
}

impl DialogueConfig {
    /// Reject empty vocabularies and blank entries
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lists = [
            ("dialogue.backchannel", &self.backchannel),
            ("dialogue.interrupt", &self.interrupt),
            ("dialogue.knowledge_hints", &self.knowledge_hints),
        ];

        for (field, words) in lists {
            if words.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Vocabulary must not be empty".to_string(),
                });
            }
            // A blank interrupt phrase would match every utterance
            if words.iter().any(|w| w.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Vocabulary entries must not be blank".to_string(),
                });
            }
        }

        Ok(())
    }
}
