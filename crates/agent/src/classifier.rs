//! Turn classification
//!
//! Case-insensitive predicates over final transcripts. None of them fail:
//! empty or odd input simply matches nothing.

use barge_config::DialogueConfig;
use std::collections::HashSet;

/// Vocabulary-driven utterance classifier
#[derive(Debug, Clone)]
pub struct TurnClassifier {
    backchannel: HashSet<String>,
    interrupt: Vec<String>,
    knowledge_hints: HashSet<String>,
}

impl Default for TurnClassifier {
    fn default() -> Self {
        Self::from_config(&DialogueConfig::default())
    }
}

impl TurnClassifier {
    pub fn from_config(config: &DialogueConfig) -> Self {
        let normalize = |w: &String| w.trim().to_lowercase();
        Self {
            backchannel: config.backchannel.iter().map(normalize).collect(),
            interrupt: config.interrupt.iter().map(normalize).collect(),
            knowledge_hints: config.knowledge_hints.iter().map(normalize).collect(),
        }
    }

    /// Whole utterance is an acknowledgement ("ok", "mm")
    pub fn is_backchannel(&self, text: &str) -> bool {
        self.backchannel.contains(&text.trim().to_lowercase())
    }

    /// Utterance contains an interrupt phrase anywhere
    ///
    /// Substring match: "noway" matches "no".
    pub fn is_interrupt(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.interrupt
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }

    /// Utterance is a question or starts with a knowledge hint word
    pub fn is_knowledge_query(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        if lowered.contains('?') {
            return true;
        }
        lowered
            .split_whitespace()
            .next()
            .is_some_and(|first| self.knowledge_hints.contains(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backchannel_exact_match() {
        let classifier = TurnClassifier::default();
        for word in ["yeah", "ok", "okay", "hmm", "uh-huh", "right", "mm", "ah"] {
            assert!(classifier.is_backchannel(word), "{word}");
            assert!(classifier.is_backchannel(&format!("  {}  ", word.to_uppercase())));
        }
        assert!(!classifier.is_backchannel("yeah!"));
        assert!(!classifier.is_backchannel("yeah ok"));
        assert!(!classifier.is_backchannel(""));
    }

    #[test]
    fn test_interrupt_substring_match() {
        let classifier = TurnClassifier::default();
        assert!(classifier.is_interrupt("stop"));
        assert!(classifier.is_interrupt("Please STOP talking"));
        assert!(classifier.is_interrupt("hold on a second"));
        assert!(classifier.is_interrupt("noway"));
        assert!(!classifier.is_interrupt("tell me more"));
        assert!(!classifier.is_interrupt(""));
    }

    #[test]
    fn test_backchannel_words_are_not_interrupts() {
        let classifier = TurnClassifier::default();
        for word in ["yeah", "ok", "okay", "hmm", "uh-huh", "right", "mm", "ah"] {
            assert!(!classifier.is_interrupt(word), "{word}");
        }
    }

    #[test]
    fn test_knowledge_query() {
        let classifier = TurnClassifier::default();
        assert!(classifier.is_knowledge_query("What time is it"));
        assert!(classifier.is_knowledge_query("tell me a joke?"));
        assert!(classifier.is_knowledge_query("  EXPLAIN quantum tunnelling"));
        assert!(!classifier.is_knowledge_query("tell me a joke"));
        assert!(!classifier.is_knowledge_query(""));
        assert!(!classifier.is_knowledge_query("   "));
    }

    #[test]
    fn test_custom_vocabulary() {
        let config = DialogueConfig {
            backchannel: vec!["Sure".to_string()],
            interrupt: vec!["Enough".to_string()],
            knowledge_hints: vec!["Define".to_string()],
            ..Default::default()
        };
        let classifier = TurnClassifier::from_config(&config);
        assert!(classifier.is_backchannel("sure"));
        assert!(!classifier.is_backchannel("yeah"));
        assert!(classifier.is_interrupt("that's enough"));
        assert!(!classifier.is_interrupt("stop"));
        assert!(classifier.is_knowledge_query("define entropy"));
        assert!(!classifier.is_knowledge_query("what is entropy"));
    }
}
