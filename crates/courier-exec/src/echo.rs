use async_trait::async_trait;

use courier_core::{ExecContext, ExecError, Executor};
use courier_model::{Task, TaskKind};

/// Protocol conformance executor: returns the payload wrapped unchanged.
#[derive(Default)]
pub struct EchoExecutor;

#[async_trait]
impl Executor for EchoExecutor {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn supports(&self, kind: &TaskKind) -> bool {
        matches!(kind, TaskKind::Echo(_))
    }

    async fn execute(
        &self,
        _ctx: &ExecContext<'_>,
        task: &Task,
    ) -> Result<serde_json::Value, ExecError> {
        let TaskKind::Echo(payload) = &task.kind else {
            return Err(ExecError::Unsupported("not an echo task".to_string()));
        };
        Ok(serde_json::json!({ "echo": payload }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use courier_core::{Orchestrator, OrchestratorError};
    use courier_model::{
        Ack, Health, HeartbeatRequest, InventoryRequest, LeaseRequest, LeaseResponse,
        RegisterRequest, ResultRequest,
    };

    use super::*;

    struct NullOrchestrator;

    #[async_trait]
    impl Orchestrator for NullOrchestrator {
        async fn register(&self, _req: &RegisterRequest) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn lease(&self, _req: &LeaseRequest) -> Result<LeaseResponse, OrchestratorError> {
            Ok(LeaseResponse {
                leased: vec![],
                backoff_ms: None,
            })
        }
        async fn heartbeat(&self, _req: &HeartbeatRequest) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn report(&self, _req: &ResultRequest) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn submit_inventory(
            &self,
            _req: &InventoryRequest,
        ) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn health(&self) -> Result<Health, OrchestratorError> {
            Ok(Health { ok: true })
        }
    }

    #[tokio::test]
    async fn echoes_the_payload_back() {
        let orchestrator: Arc<dyn Orchestrator> = Arc::new(NullOrchestrator);
        let ctx = ExecContext {
            orchestrator: orchestrator.as_ref(),
            runner_id: "r1",
        };
        let task = Task {
            id: "t1".to_string(),
            lease_id: "l1".to_string(),
            kind: TaskKind::Echo(serde_json::json!({"x": 1})),
        };

        let result = EchoExecutor.execute(&ctx, &task).await.unwrap();
        assert_eq!(result, serde_json::json!({"echo": {"x": 1}}));
    }
}
