use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::trace;

use courier_model::{Task, TaskKind};

use crate::orchestrator::Orchestrator;

/// Failure of a single task execution attempt.
///
/// The display string becomes the `error` field of the failed result
/// report, so messages are written for the orchestrator's operators.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    Failed(String),
    #[error("unsupported target: {0}")]
    Unsupported(String),
}

/// What an executor gets to see besides the task itself.
///
/// The orchestrator handle is for task types that push intermediate
/// payloads (the LAN sweep submits its inventory through it).
pub struct ExecContext<'a> {
    pub orchestrator: &'a dyn Orchestrator,
    pub runner_id: &'a str,
}

/// One task type implementation.
#[async_trait]
pub trait Executor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this executor handles the given task kind.
    fn supports(&self, kind: &TaskKind) -> bool;

    /// Runs the task to completion. Exactly one attempt; the caller turns
    /// an `Err` into a failed result report.
    async fn execute(
        &self,
        ctx: &ExecContext<'_>,
        task: &Task,
    ) -> Result<serde_json::Value, ExecError>;
}

/// First-match dispatch over registered executors.
#[derive(Default)]
pub struct ExecutorRouter {
    executors: Vec<Arc<dyn Executor>>,
}

impl ExecutorRouter {
    #[inline]
    pub fn new() -> Self {
        Self {
            executors: Vec::new(),
        }
    }

    #[inline]
    pub fn register(&mut self, executor: Arc<dyn Executor>) {
        self.executors.push(executor);
    }

    pub fn pick(&self, kind: &TaskKind) -> Option<&Arc<dyn Executor>> {
        let found = self.executors.iter().find(|e| e.supports(kind));
        if let Some(executor) = found {
            trace!(executor = executor.name(), kind = kind.kind(), "executor picked");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoOnly;

    #[async_trait]
    impl Executor for EchoOnly {
        fn name(&self) -> &'static str {
            "echo-only"
        }

        fn supports(&self, kind: &TaskKind) -> bool {
            matches!(kind, TaskKind::Echo(_))
        }

        async fn execute(
            &self,
            _ctx: &ExecContext<'_>,
            _task: &Task,
        ) -> Result<serde_json::Value, ExecError> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn picks_supporting_executor() {
        let mut router = ExecutorRouter::new();
        router.register(Arc::new(EchoOnly));

        let kind = TaskKind::Echo(serde_json::Value::Null);
        assert!(router.pick(&kind).is_some());
    }

    #[test]
    fn unknown_kind_has_no_executor() {
        let mut router = ExecutorRouter::new();
        router.register(Arc::new(EchoOnly));

        let kind = TaskKind::Unknown {
            kind: "teleport".to_string(),
            payload: serde_json::Value::Null,
        };
        assert!(router.pick(&kind).is_none());
    }
}
