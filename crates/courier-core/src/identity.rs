use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use courier_model::RunnerIdentity;

/// Resolves the stable runner identity.
///
/// The id is read from the first candidate file that holds one; otherwise a
/// fresh UUID is generated and written back so restarts reuse it. If no
/// candidate path is writable the id lives only for this process.
pub struct IdentityProvider {
    paths: Vec<PathBuf>,
}

impl IdentityProvider {
    /// System-wide candidate locations, preferred first.
    pub fn system() -> Self {
        let mut paths = vec![PathBuf::from("/var/lib/courier/runner-id")];
        if let Ok(home) = std::env::var("HOME")
            && !home.is_empty()
        {
            paths.push(PathBuf::from(home).join(".courier").join("runner-id"));
        }
        Self { paths }
    }

    /// Single fixed location, used by tests and containerized deployments.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    /// Returns the persisted runner id, generating and storing one if needed.
    pub fn runner_id(&self) -> String {
        if let Some(id) = self.load() {
            return id;
        }

        let id = uuid::Uuid::new_v4().to_string();
        if self.store(&id) {
            debug!(runner_id = %id, "generated and persisted new runner id");
        } else {
            warn!(runner_id = %id, "no writable identity path; id will not survive restart");
        }
        id
    }

    /// Full identity: persisted id, configured labels, host metadata.
    pub fn identity(&self, labels: BTreeSet<String>) -> RunnerIdentity {
        let mut identity = RunnerIdentity::new(self.runner_id());
        identity.labels = labels;
        identity.meta.insert(
            "platform".to_string(),
            serde_json::Value::String(platform().to_string()),
        );
        identity.meta.insert(
            "arch".to_string(),
            serde_json::Value::String(arch().to_string()),
        );
        identity
            .meta
            .insert("os".to_string(), serde_json::Value::String(os_info()));
        if let Some(host) = host_name() {
            identity
                .meta
                .insert("hostname".to_string(), serde_json::Value::String(host));
        }
        identity
    }

    fn load(&self) -> Option<String> {
        for path in &self.paths {
            if let Ok(content) = fs::read_to_string(path) {
                let id = content.trim();
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
        None
    }

    fn store(&self, id: &str) -> bool {
        for path in &self.paths {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if fs::write(path, id).is_ok() {
                return true;
            }
        }
        false
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::system()
    }
}

/// OS family, e.g. `linux` or `macos`.
#[inline]
pub fn platform() -> &'static str {
    std::env::consts::OS
}

/// CPU architecture, e.g. `x86_64`.
#[inline]
pub fn arch() -> &'static str {
    std::env::consts::ARCH
}

/// OS distribution info (Linux only, best effort).
pub fn os_info() -> String {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = fs::read_to_string("/etc/os-release") {
            for line in content.lines() {
                if let Some(name) = line.strip_prefix("PRETTY_NAME=") {
                    return name.trim_matches('"').to_string();
                }
            }
        }
    }

    platform().to_string()
}

fn host_name() -> Option<String> {
    hostname::get().ok()?.into_string().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_persisted_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner-id");
        let provider = IdentityProvider::at(&path);

        let first = provider.runner_id();
        let second = provider.runner_id();

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), first);
    }

    #[test]
    fn existing_id_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner-id");
        fs::write(&path, "runner-cafe\n").unwrap();

        let provider = IdentityProvider::at(&path);
        assert_eq!(provider.runner_id(), "runner-cafe");
    }

    #[test]
    fn identity_carries_labels_and_host_meta() {
        let dir = tempfile::tempdir().unwrap();
        let provider = IdentityProvider::at(dir.path().join("runner-id"));

        let labels: BTreeSet<String> = ["lan".to_string()].into();
        let identity = provider.identity(labels.clone());

        assert_eq!(identity.labels, labels);
        assert!(identity.meta.contains_key("platform"));
        assert!(identity.meta.contains_key("arch"));
    }
}
