use async_trait::async_trait;
use thiserror::Error;

use courier_model::{
    Ack, Health, HeartbeatRequest, InventoryRequest, LeaseRequest, LeaseResponse, RegisterRequest,
    ResultRequest,
};

/// Failure of an orchestrator call.
///
/// Payloads are plain strings so implementations built on any HTTP stack
/// can map into this without leaking their error types upward.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Non-2xx response; carries the status and body text for diagnostics.
    #[error("orchestrator returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Network-level failure before a response was received.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response arrived but did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
}

/// The orchestrator contract as seen from a runner.
///
/// One implementation speaks signed HTTPS; tests substitute in-memory
/// fakes. Callers own the retry policy: lease failures feed the idle
/// backoff, heartbeat failures are logged and swallowed, result and
/// inventory failures are logged without retry.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<Ack, OrchestratorError>;
    async fn lease(&self, req: &LeaseRequest) -> Result<LeaseResponse, OrchestratorError>;
    async fn heartbeat(&self, req: &HeartbeatRequest) -> Result<Ack, OrchestratorError>;
    async fn report(&self, req: &ResultRequest) -> Result<Ack, OrchestratorError>;
    async fn submit_inventory(&self, req: &InventoryRequest) -> Result<Ack, OrchestratorError>;
    async fn health(&self) -> Result<Health, OrchestratorError>;
}
