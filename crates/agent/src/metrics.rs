//! Task and turn counters
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! these are no-ops.

use crate::task::TaskCheckpoint;

pub fn record_task_started() {
    ::metrics::counter!("barge_tasks_started_total").increment(1);
}

pub fn record_task_cancelled(checkpoint: TaskCheckpoint) {
    ::metrics::counter!("barge_tasks_cancelled_total", "checkpoint" => checkpoint.as_str())
        .increment(1);
}

pub fn record_task_failed(stage: &'static str) {
    ::metrics::counter!("barge_tasks_failed_total", "stage" => stage).increment(1);
}

pub fn record_answer_delivered() {
    ::metrics::counter!("barge_answers_delivered_total").increment(1);
}

pub fn record_turn(decision: &'static str) {
    ::metrics::counter!("barge_turns_total", "decision" => decision).increment(1);
}
