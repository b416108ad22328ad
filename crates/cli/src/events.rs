//! Speech-pipeline events on the wire
//!
//! One JSON object per line, tagged by `type`:
//!
//! ```text
//! {"type":"state_change","state":"speaking"}
//! {"type":"transcript","text":"what is rust?","is_final":true}
//! {"type":"vad_start"}
//! ```

use barge_agent::{DialogueController, TurnDecision};
use barge_core::{AgentState, TranscriptEvent};
use serde::{Deserialize, Serialize};

/// Event delivered by the speech pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Agent started or stopped speaking
    StateChange { state: AgentState },
    /// Transcription update
    Transcript {
        text: String,
        #[serde(default)]
        is_final: bool,
    },
    /// User speech detected
    VadStart,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_event(line: &str) -> Result<Option<PipelineEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Dispatch an event to the controller
///
/// Returns the turn decision for transcript events.
pub fn apply_event(controller: &mut DialogueController, event: PipelineEvent) -> Option<TurnDecision> {
    match event {
        PipelineEvent::StateChange { state } => {
            controller.on_state_change(state);
            None
        },
        PipelineEvent::Transcript { text, is_final } => {
            Some(controller.on_transcript(&TranscriptEvent { text, is_final }))
        },
        PipelineEvent::VadStart => {
            controller.on_vad_start();
            None
        },
    }
}
