use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identity a runner presents to the orchestrator.
///
/// The `id` is generated once per install and persisted locally, so restarts
/// reuse the same identity. Labels and metadata are attached at registration
/// and may change between runs; the id never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerIdentity {
    /// Stable runner identifier.
    pub id: String,
    /// Capability labels the orchestrator may match leases against.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    /// Free-form metadata (platform, arch, hostname, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl RunnerIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: BTreeSet::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}
