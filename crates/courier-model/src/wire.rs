//! Request and response bodies for the orchestrator HTTP contract.
//!
//! Every body serializes as camelCase JSON. Signing happens a layer above:
//! these types only fix the shapes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{HostInventory, LeaseMs, Task, TaskOutcome};

/// POST /runners/register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub runner_id: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// POST /tasks/lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRequest {
    pub runner_id: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    /// Upper bound on tasks granted in one response.
    pub max: u32,
    /// Requested lease TTL per task, in milliseconds.
    pub lease_ms: LeaseMs,
}

/// Response to POST /tasks/lease.
///
/// An empty `leased` array means no work is available; `backoff_ms`, when
/// present, overrides the runner's own idle delay computation verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseResponse {
    #[serde(default)]
    pub leased: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_ms: Option<u64>,
}

/// POST /tasks/heartbeat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub runner_id: String,
    pub lease_id: String,
    /// How far to push the lease expiry out, in milliseconds.
    pub extend_ms: LeaseMs,
}

/// POST /tasks/result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub runner_id: String,
    pub lease_id: String,
    pub task_id: String,
    pub status: TaskOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /lan/submit-inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRequest {
    pub runner_id: String,
    pub lease_id: String,
    pub task_id: String,
    pub hosts: Vec<HostInventory>,
}

/// Generic acknowledgement body for register/heartbeat/result calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,
}

/// GET /health (unsigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub ok: bool,
}
