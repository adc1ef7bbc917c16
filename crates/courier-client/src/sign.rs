use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignError {
    /// Startup configuration problem, not a runtime condition.
    #[error("signing secret is empty")]
    EmptySecret,
}

/// Signed material for one outbound request.
///
/// Built fresh for every call; never cached or reused across requests. The
/// `body` field is the exact string transmitted, so the bytes signed and
/// the bytes sent cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Unix epoch milliseconds as a decimal string. The same value goes
    /// into the signed prefix and the timestamp header.
    pub timestamp: String,
    /// Hex-encoded HMAC-SHA256 over `"{timestamp}.{body}"`.
    pub signature: String,
    pub body: String,
}

/// HMAC-SHA256 request signer keyed by the shared orchestrator secret.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
}

impl Signer {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(SignError::EmptySecret);
        }
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    /// Deterministic signature over `"{timestamp}.{body}"`, hex-encoded.
    pub fn sign(&self, timestamp: &str, body: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Stamps and signs a serialized body for transmission.
    pub fn envelope(&self, body: String) -> Envelope {
        let timestamp = epoch_millis();
        let signature = self.sign(&timestamp, &body);
        Envelope {
            timestamp,
            signature,
            body,
        }
    }
}

fn epoch_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .to_string()
}
