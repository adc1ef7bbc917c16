use serde::{Deserialize, Serialize};

/// One responsive host discovered by a LAN sweep.
///
/// `score` is a non-negative heuristic derived from which ports answered;
/// management ports weigh more than ordinary services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInventory {
    pub ip: String,
    pub ports: Vec<u16>,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let host = HostInventory {
            ip: "10.0.0.5".to_string(),
            ports: vec![22],
            score: 6,
        };

        let json = serde_json::to_string(&host).unwrap();
        let back: HostInventory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, host);
    }
}
