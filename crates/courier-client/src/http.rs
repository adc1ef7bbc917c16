use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use courier_core::{Orchestrator, OrchestratorError, RunnerConfig};
use courier_model::{
    Ack, Health, HeartbeatRequest, InventoryRequest, LeaseRequest, LeaseResponse, RegisterRequest,
    ResultRequest,
};

use crate::sign::{SignError, Signer};

pub const HEADER_TIMESTAMP: &str = "x-courier-timestamp";
pub const HEADER_SIGNATURE: &str = "x-courier-signature";

/// Signed HTTPS client for the orchestrator contract.
///
/// Every POST carries a fresh [`crate::Envelope`]: the serialized body plus
/// `x-courier-timestamp` and `x-courier-signature` headers. `/health` is
/// the one unsigned call.
pub struct OrchestratorClient {
    http: reqwest::Client,
    base_url: String,
    signer: Signer,
}

impl OrchestratorClient {
    /// Fails only on configuration problems (empty secret).
    pub fn new(base_url: impl Into<String>, secret: impl AsRef<[u8]>) -> Result<Self, SignError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer: Signer::new(secret)?,
        })
    }

    pub fn from_config(config: &RunnerConfig) -> Result<Self, SignError> {
        Self::new(config.base_url.clone(), &config.secret)
    }

    async fn post_signed<B, R>(&self, path: &str, body: &B) -> Result<R, OrchestratorError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body)
            .map_err(|e| OrchestratorError::Transport(format!("serialize request: {e}")))?;
        let envelope = self.signer.envelope(body);

        debug!(path, "signed orchestrator call");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(HEADER_TIMESTAMP, envelope.timestamp.as_str())
            .header(HEADER_SIGNATURE, envelope.signature.as_str())
            .body(envelope.body)
            .send()
            .await
            .map_err(|e| OrchestratorError::Transport(e.to_string()))?;

        read_json(path, response).await
    }
}

async fn read_json<R: DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> Result<R, OrchestratorError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| OrchestratorError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(OrchestratorError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        OrchestratorError::InvalidResponse(format!("{path}: {e}, body: {body}"))
    })
}

#[async_trait]
impl Orchestrator for OrchestratorClient {
    #[instrument(skip_all, fields(runner_id = %req.runner_id))]
    async fn register(&self, req: &RegisterRequest) -> Result<Ack, OrchestratorError> {
        self.post_signed("/runners/register", req).await
    }

    async fn lease(&self, req: &LeaseRequest) -> Result<LeaseResponse, OrchestratorError> {
        self.post_signed("/tasks/lease", req).await
    }

    async fn heartbeat(&self, req: &HeartbeatRequest) -> Result<Ack, OrchestratorError> {
        self.post_signed("/tasks/heartbeat", req).await
    }

    async fn report(&self, req: &ResultRequest) -> Result<Ack, OrchestratorError> {
        self.post_signed("/tasks/result", req).await
    }

    async fn submit_inventory(&self, req: &InventoryRequest) -> Result<Ack, OrchestratorError> {
        self.post_signed("/lan/submit-inventory", req).await
    }

    async fn health(&self) -> Result<Health, OrchestratorError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| OrchestratorError::Transport(e.to_string()))?;

        read_json("/health", response).await
    }
}
