use serde::{Deserialize, Serialize};

/// Target description for a LAN sweep task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanScanTarget {
    /// CIDR range to sweep. Only `/24` prefixes are supported.
    pub cidr: String,
    /// TCP ports probed on each responsive host.
    pub ports: Vec<u16>,
}

/// Work description for a leased task.
///
/// Each variant is one task type the runner knows how to execute. Payloads
/// the runner cannot interpret — an unrecognized `type`, or a known type
/// whose payload does not parse — land in [`TaskKind::Unknown`] and are
/// skipped by dispatch rather than failing the whole lease batch.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Protocol conformance task: the payload is echoed back verbatim.
    Echo(serde_json::Value),
    /// Sweep a `/24` range and report responsive hosts with open ports.
    LanScan(LanScanTarget),
    /// Anything this runner does not understand.
    Unknown {
        kind: String,
        payload: serde_json::Value,
    },
}

impl TaskKind {
    /// Wire name of the task type, used for logging and routing.
    pub fn kind(&self) -> &str {
        match self {
            TaskKind::Echo(_) => "echo",
            TaskKind::LanScan(_) => "lan-scan",
            TaskKind::Unknown { kind, .. } => kind,
        }
    }
}

/// One unit of leased work.
///
/// Immutable once leased; its outcome is reported exactly once against
/// `lease_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskWire", into = "TaskWire")]
pub struct Task {
    pub id: String,
    pub lease_id: String,
    pub kind: TaskKind,
}

/// Flat wire shape: `{ id, leaseId, type, payload }`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    id: String,
    lease_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    payload: serde_json::Value,
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        let kind = match wire.kind.as_str() {
            "echo" => TaskKind::Echo(wire.payload),
            "lan-scan" => match serde_json::from_value(wire.payload.clone()) {
                Ok(target) => TaskKind::LanScan(target),
                Err(_) => TaskKind::Unknown {
                    kind: wire.kind,
                    payload: wire.payload,
                },
            },
            _ => TaskKind::Unknown {
                kind: wire.kind,
                payload: wire.payload,
            },
        };

        Task {
            id: wire.id,
            lease_id: wire.lease_id,
            kind,
        }
    }
}

impl From<Task> for TaskWire {
    fn from(task: Task) -> Self {
        let (kind, payload) = match task.kind {
            TaskKind::Echo(payload) => ("echo".to_string(), payload),
            TaskKind::LanScan(target) => (
                "lan-scan".to_string(),
                serde_json::to_value(target).unwrap_or(serde_json::Value::Null),
            ),
            TaskKind::Unknown { kind, payload } => (kind, payload),
        };

        TaskWire {
            id: task.id,
            lease_id: task.lease_id,
            kind,
            payload,
        }
    }
}
