//! Dialogue controller
//!
//! Single owner of the agent-speaking state and the current retrieval task.
//! Pipeline events come in through `on_state_change`, `on_vad_start` and
//! `on_transcript`; speech effects go out on a broadcast channel. Task
//! workers run on the Tokio runtime so event handling never waits on
//! retrieval or generation.

use barge_config::DialogueConfig;
use barge_core::{AgentState, AnswerGenerator, RetrievedChunk, TranscriptEvent};
use barge_rag::RetrievalAgent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::classifier::TurnClassifier;
use crate::metrics;
use crate::task::{CancellableTask, TaskOutcome};
use crate::AgentError;

/// Effect channel capacity
const EFFECT_CHANNEL_CAPACITY: usize = 100;

/// Effects for the speech pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEffect {
    /// Stop the current speech output now
    StopSpeech,
    /// Speak a grounded answer
    Speak {
        answer: String,
        chunks: Vec<RetrievedChunk>,
    },
    /// Continue with a normal conversational reply
    Reply { text: String },
}

/// How a transcript event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDecision {
    /// Not final, ignored
    Partial,
    /// Interrupt phrase while speaking; speech stopped
    Interrupted,
    /// Acknowledgement while speaking; ignored
    Backchannel,
    /// Blank final transcript; ignored
    Empty,
    /// Other speech while speaking; current task cancelled
    BargeIn,
    /// Knowledge query while idle; task started
    KnowledgeQuery { task_id: u64 },
    /// Ordinary turn handed to the reply generator
    PassThrough,
}

impl TurnDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Interrupted => "interrupted",
            Self::Backchannel => "backchannel",
            Self::Empty => "empty",
            Self::BargeIn => "barge_in",
            Self::KnowledgeQuery { .. } => "knowledge_query",
            Self::PassThrough => "pass_through",
        }
    }
}

struct TaskHandle {
    task: CancellableTask,
    worker: JoinHandle<TaskOutcome>,
}

/// Turn-taking state machine
pub struct DialogueController {
    state: AgentState,
    current: Option<TaskHandle>,
    next_task_id: u64,
    classifier: TurnClassifier,
    retriever: Arc<RetrievalAgent>,
    generator: Arc<dyn AnswerGenerator>,
    effect_tx: broadcast::Sender<DialogueEffect>,
    cancel_superseded: bool,
}

impl DialogueController {
    pub fn new(
        config: &DialogueConfig,
        retriever: Arc<RetrievalAgent>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        let (effect_tx, _) = broadcast::channel(EFFECT_CHANNEL_CAPACITY);
        Self {
            state: AgentState::default(),
            current: None,
            next_task_id: 1,
            classifier: TurnClassifier::from_config(config),
            retriever,
            generator,
            effect_tx,
            cancel_superseded: config.cancel_superseded,
        }
    }

    /// Subscribe to speech effects
    pub fn subscribe(&self) -> broadcast::Receiver<DialogueEffect> {
        self.effect_tx.subscribe()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Task started by the latest knowledge query, if still tracked
    pub fn current_task(&self) -> Option<&CancellableTask> {
        self.current.as_ref().map(|handle| &handle.task)
    }

    pub fn on_state_change(&mut self, state: AgentState) {
        tracing::info!(from = %self.state, to = %state, "Agent state changed");
        self.state = state;
    }

    pub fn on_vad_start(&self) {
        tracing::debug!(state = %self.state, "User speech started");
    }

    /// Handle a transcript event
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_transcript(&mut self, event: &TranscriptEvent) -> TurnDecision {
        if !event.is_final {
            return TurnDecision::Partial;
        }

        self.reap_finished();

        let text = event.trimmed();
        let decision = if self.state.is_speaking() {
            self.handle_while_speaking(text)
        } else {
            self.handle_while_idle(text)
        };

        metrics::record_turn(decision.as_str());
        tracing::debug!(
            state = %self.state,
            decision = decision.as_str(),
            text,
            "Final transcript handled"
        );
        decision
    }

    fn handle_while_speaking(&mut self, text: &str) -> TurnDecision {
        if self.classifier.is_interrupt(text) {
            self.cancel_current("interrupt");
            self.emit(DialogueEffect::StopSpeech);
            return TurnDecision::Interrupted;
        }
        if self.classifier.is_backchannel(text) {
            return TurnDecision::Backchannel;
        }
        if text.is_empty() {
            return TurnDecision::Empty;
        }
        self.cancel_current("barge_in");
        TurnDecision::BargeIn
    }

    fn handle_while_idle(&mut self, text: &str) -> TurnDecision {
        if text.is_empty() {
            return TurnDecision::Empty;
        }
        if self.classifier.is_knowledge_query(text) {
            let task_id = self.start_task(text);
            return TurnDecision::KnowledgeQuery { task_id };
        }
        self.emit(DialogueEffect::Reply {
            text: text.to_string(),
        });
        TurnDecision::PassThrough
    }

    fn start_task(&mut self, question: &str) -> u64 {
        let task = CancellableTask::new(self.next_task_id);
        self.next_task_id += 1;

        if let Some(previous) = self.current.take() {
            if self.cancel_superseded {
                previous.task.cancel();
                tracing::info!(
                    task_id = previous.task.id(),
                    superseded_by = task.id(),
                    "Cancelled superseded task"
                );
            } else {
                tracing::info!(
                    task_id = previous.task.id(),
                    superseded_by = task.id(),
                    "Superseded task left running"
                );
            }
        }

        let worker = {
            let task = task.clone();
            let question = question.to_string();
            let retriever = Arc::clone(&self.retriever);
            let generator = Arc::clone(&self.generator);
            let effect_tx = self.effect_tx.clone();
            tokio::spawn(async move {
                let token = task.token().clone();
                task.run(&question, &retriever, generator.as_ref(), move |answer, chunks| {
                    if token.is_cancelled() {
                        return false;
                    }
                    // No subscribers is not an error
                    let _ = effect_tx.send(DialogueEffect::Speak { answer, chunks });
                    true
                })
                .await
            })
        };

        tracing::info!(task_id = task.id(), question, "Started retrieval task");
        let task_id = task.id();
        self.current = Some(TaskHandle { task, worker });
        task_id
    }

    fn cancel_current(&self, reason: &'static str) {
        if let Some(handle) = &self.current {
            handle.task.cancel();
            tracing::info!(task_id = handle.task.id(), reason, "Cancelled current task");
        }
    }

    /// Drop the current task once its worker has finished
    fn reap_finished(&mut self) {
        if self
            .current
            .as_ref()
            .is_some_and(|handle| handle.worker.is_finished())
        {
            if let Some(handle) = self.current.take() {
                tracing::debug!(task_id = handle.task.id(), "Reaped finished task");
            }
        }
    }

    fn emit(&self, effect: DialogueEffect) {
        // No subscribers is not an error
        let _ = self.effect_tx.send(effect);
    }

    /// Wait for the current task to finish and release it
    pub async fn wait_current(&mut self) -> Option<TaskOutcome> {
        let handle = self.current.take()?;
        let outcome = match handle.worker.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let error = AgentError::Runtime(e.to_string());
                tracing::error!(task_id = handle.task.id(), error = %error, "Task worker failed");
                TaskOutcome::Failed(error)
            },
        };
        Some(outcome)
    }

    /// Cancel the current task, if any
    pub fn shutdown(&self) {
        self.cancel_current("shutdown");
    }
}
