//! Cancellable retrieval task
//!
//! One knowledge query answered end to end: retrieve, generate, deliver.
//! Cancellation is cooperative. The task stops itself at fixed checkpoints
//! and never applies a result once its token is cancelled.

use barge_core::{AnswerGenerator, CancellationToken, GenerationOutcome, RetrievedChunk};
use barge_rag::RetrievalAgent;
use std::fmt;

use crate::metrics;
use crate::AgentError;

/// Points where a running task checks for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCheckpoint {
    /// Retrieval finished, generation not started
    AfterRetrieval,
    /// Generator observed the token
    DuringGeneration,
    /// Answer ready, not yet handed to the callback
    BeforeDelivery,
}

impl TaskCheckpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterRetrieval => "after_retrieval",
            Self::DuringGeneration => "during_generation",
            Self::BeforeDelivery => "before_delivery",
        }
    }
}

impl fmt::Display for TaskCheckpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a task run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Callback applied the answer
    Delivered,
    /// Stopped at a checkpoint
    Cancelled(TaskCheckpoint),
    /// Retrieval or generation failed
    Failed(AgentError),
}

impl TaskOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Handle to one retrieval + generation run
///
/// Clones share the same cancellation flag.
#[derive(Debug, Clone)]
pub struct CancellableTask {
    id: u64,
    token: CancellationToken,
}

impl CancellableTask {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cancellation. Idempotent, also after completion.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token observed by the generator and the delivery callback
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Answer `question`, handing the result to `on_done` unless cancelled
    ///
    /// `on_done` returns whether it applied the answer; it is expected to
    /// re-check cancellation itself immediately before acting.
    pub async fn run<F>(
        &self,
        question: &str,
        retriever: &RetrievalAgent,
        generator: &dyn AnswerGenerator,
        on_done: F,
    ) -> TaskOutcome
    where
        F: FnOnce(String, Vec<RetrievedChunk>) -> bool + Send,
    {
        metrics::record_task_started();

        let chunks = match retriever.retrieve(question).await {
            Ok(chunks) => chunks,
            Err(e) => return self.fail(AgentError::Retrieval(e.to_string())),
        };

        if self.cancelled() {
            return self.abort(TaskCheckpoint::AfterRetrieval);
        }

        let prompt = retriever.build_prompt(question, &chunks);
        tracing::debug!(
            task_id = self.id,
            chunks = chunks.len(),
            generator = generator.name(),
            prompt = %prompt,
            "Built grounded prompt"
        );

        let answer = match generator.generate(&prompt, &self.token).await {
            Ok(GenerationOutcome::Completed(answer)) => answer,
            Ok(GenerationOutcome::Cancelled) => {
                return self.abort(TaskCheckpoint::DuringGeneration);
            },
            Err(e) => return self.fail(AgentError::Generation(e.to_string())),
        };

        if self.cancelled() || !on_done(answer, chunks) {
            return self.abort(TaskCheckpoint::BeforeDelivery);
        }

        metrics::record_answer_delivered();
        tracing::info!(task_id = self.id, "Answer delivered");
        TaskOutcome::Delivered
    }

    fn abort(&self, checkpoint: TaskCheckpoint) -> TaskOutcome {
        metrics::record_task_cancelled(checkpoint);
        tracing::info!(task_id = self.id, %checkpoint, "Task cancelled");
        TaskOutcome::Cancelled(checkpoint)
    }

    fn fail(&self, error: AgentError) -> TaskOutcome {
        metrics::record_task_failed(error.stage());
        tracing::error!(task_id = self.id, error = %error, "Task failed");
        TaskOutcome::Failed(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use barge_core::{KnowledgeStore, SourceDocument};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticStore;

    #[async_trait]
    impl KnowledgeStore for StaticStore {
        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
        ) -> barge_core::Result<Vec<RetrievedChunk>> {
            Ok(vec![RetrievedChunk::new(
                0.9,
                "france.txt",
                "Paris is the capital of France.",
            )])
        }

        async fn ingest(&self, _documents: &[SourceDocument]) -> barge_core::Result<usize> {
            Ok(0)
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KnowledgeStore for BrokenStore {
        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
        ) -> barge_core::Result<Vec<RetrievedChunk>> {
            Err(barge_core::Error::Rag("index missing".to_string()))
        }

        async fn ingest(&self, _documents: &[SourceDocument]) -> barge_core::Result<usize> {
            Ok(0)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    /// What the scripted generator does when called
    enum Script {
        Answer,
        ObserveCancel,
        CancelThenAnswer,
        Fail,
    }

    struct ScriptedGenerator {
        script: Script,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Script) -> Self {
            Self {
                script,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AnswerGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            cancel: &CancellationToken,
        ) -> barge_core::Result<GenerationOutcome> {
            self.prompts.lock().push(prompt.to_string());
            match self.script {
                Script::Answer => Ok(GenerationOutcome::Completed("Paris.".to_string())),
                Script::ObserveCancel => {
                    cancel.cancel();
                    Ok(GenerationOutcome::Cancelled)
                },
                Script::CancelThenAnswer => {
                    cancel.cancel();
                    Ok(GenerationOutcome::Completed("Paris.".to_string()))
                },
                Script::Fail => Err(barge_core::Error::Generation("model offline".to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn retriever(store: impl KnowledgeStore) -> RetrievalAgent {
        RetrievalAgent::new(Arc::new(store), 3)
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let task = CancellableTask::new(1);
        assert!(!task.cancelled());

        task.cancel();
        assert!(task.cancelled());
        task.cancel();
        assert!(task.cancelled());

        let clone = task.clone();
        assert!(clone.cancelled());
        assert_eq!(clone.id(), 1);
    }

    #[test]
    fn test_checkpoint_display() {
        assert_eq!(TaskCheckpoint::AfterRetrieval.to_string(), "after_retrieval");
        assert_eq!(TaskCheckpoint::DuringGeneration.to_string(), "during_generation");
        assert_eq!(TaskCheckpoint::BeforeDelivery.to_string(), "before_delivery");
    }

    #[tokio::test]
    async fn test_run_delivers_answer_and_chunks() {
        let task = CancellableTask::new(1);
        let generator = ScriptedGenerator::new(Script::Answer);
        let delivered = Mutex::new(None);

        let outcome = task
            .run(
                "What is the capital of France?",
                &retriever(StaticStore),
                &generator,
                |answer, chunks| {
                    *delivered.lock() = Some((answer, chunks));
                    true
                },
            )
            .await;

        assert_eq!(outcome, TaskOutcome::Delivered);
        let (answer, chunks) = delivered.lock().take().unwrap();
        assert_eq!(answer, "Paris.");
        assert_eq!(chunks[0].doc_id, "france.txt");

        let prompts = generator.prompts.lock();
        assert!(prompts[0].contains("[france.txt | score=0.900]"));
        assert!(prompts[0].contains("Question: What is the capital of France?"));
    }

    #[tokio::test]
    async fn test_cancelled_before_generation_skips_generator() {
        let task = CancellableTask::new(2);
        task.cancel();
        let generator = ScriptedGenerator::new(Script::Answer);
        let calls = AtomicUsize::new(0);

        let outcome = task
            .run("why?", &retriever(StaticStore), &generator, |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
            .await;

        assert_eq!(outcome, TaskOutcome::Cancelled(TaskCheckpoint::AfterRetrieval));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(generator.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_generation() {
        let task = CancellableTask::new(3);
        let generator = ScriptedGenerator::new(Script::ObserveCancel);
        let calls = AtomicUsize::new(0);

        let outcome = task
            .run("why?", &retriever(StaticStore), &generator, |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
            .await;

        assert_eq!(outcome, TaskOutcome::Cancelled(TaskCheckpoint::DuringGeneration));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(task.cancelled());
    }

    #[tokio::test]
    async fn test_cancel_after_generation_wins() {
        let task = CancellableTask::new(4);
        let generator = ScriptedGenerator::new(Script::CancelThenAnswer);
        let calls = AtomicUsize::new(0);

        let outcome = task
            .run("why?", &retriever(StaticStore), &generator, |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
            .await;

        assert_eq!(outcome, TaskOutcome::Cancelled(TaskCheckpoint::BeforeDelivery));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_refusal_counts_as_cancelled() {
        let task = CancellableTask::new(5);
        let generator = ScriptedGenerator::new(Script::Answer);

        let outcome = task
            .run("why?", &retriever(StaticStore), &generator, |_, _| false)
            .await;

        assert_eq!(outcome, TaskOutcome::Cancelled(TaskCheckpoint::BeforeDelivery));
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_distinct_from_cancel() {
        let task = CancellableTask::new(6);
        let generator = ScriptedGenerator::new(Script::Answer);
        let calls = AtomicUsize::new(0);

        let outcome = task
            .run("why?", &retriever(BrokenStore), &generator, |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
            .await;

        match outcome {
            TaskOutcome::Failed(AgentError::Retrieval(msg)) => assert!(msg.contains("index missing")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!task.cancelled());
        assert!(generator.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let task = CancellableTask::new(7);
        let generator = ScriptedGenerator::new(Script::Fail);

        let outcome = task
            .run("why?", &retriever(StaticStore), &generator, |_, _| true)
            .await;

        assert!(matches!(
            outcome,
            TaskOutcome::Failed(AgentError::Generation(_))
        ));
    }
}
