use serde::{Deserialize, Serialize};

/// Terminal outcome of exactly one execution attempt.
///
/// Runners never retry a failed task themselves; retry, if any, is an
/// orchestrator policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskOutcome {
    Succeeded,
    Failed,
}

/// What a runner reports back for a finished task.
///
/// `result` is present for succeeded tasks, `error` for failed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub status: TaskOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    pub fn succeeded(result: serde_json::Value) -> Self {
        Self {
            status: TaskOutcome::Succeeded,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: TaskOutcome::Failed,
            result: None,
            error: Some(error.into()),
        }
    }
}
