use std::collections::BTreeSet;

use thiserror::Error;

use crate::backoff::{DEFAULT_CEILING_MS, DEFAULT_FLOOR_MS};

pub const ENV_BASE_URL: &str = "COURIER_BASE_URL";
pub const ENV_SECRET: &str = "COURIER_SECRET";
pub const ENV_LABELS: &str = "COURIER_LABELS";
pub const ENV_MAX_TASKS: &str = "COURIER_MAX_TASKS";
pub const ENV_LEASE_MS: &str = "COURIER_LEASE_MS";
pub const ENV_HEARTBEAT_MS: &str = "COURIER_HEARTBEAT_MS";
pub const ENV_LOG_FORMAT: &str = "COURIER_LOG_FORMAT";
pub const ENV_LOG_LEVEL: &str = "COURIER_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Environment-supplied runner settings.
///
/// `base_url` and `secret` are mandatory; everything else has defaults
/// sized for a persistent runner (one task at a time, two-minute leases,
/// 20-second heartbeats).
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub base_url: String,
    pub secret: String,
    pub labels: BTreeSet<String>,
    pub max_tasks: u32,
    pub lease_ms: u64,
    pub heartbeat_ms: u64,
    pub heartbeat_extend_ms: u64,
    pub backoff_floor_ms: u64,
    pub backoff_ceiling_ms: u64,
    pub log_format: String,
    pub log_level: String,
}

impl RunnerConfig {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret: secret.into(),
            labels: BTreeSet::new(),
            max_tasks: 1,
            lease_ms: 120_000,
            heartbeat_ms: 20_000,
            heartbeat_extend_ms: 60_000,
            backoff_floor_ms: DEFAULT_FLOOR_MS,
            backoff_ceiling_ms: DEFAULT_CEILING_MS,
            log_format: "text".to_string(),
            log_level: "info".to_string(),
        }
    }

    /// Reads the runner configuration from `COURIER_*` environment
    /// variables. Missing or empty `COURIER_BASE_URL` / `COURIER_SECRET`
    /// is a fatal configuration error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = require(ENV_BASE_URL)?;
        let secret = require(ENV_SECRET)?;

        let mut config = Self::new(base_url, secret);

        if let Some(labels) = optional(ENV_LABELS) {
            config.labels = labels
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(raw) = optional(ENV_MAX_TASKS) {
            config.max_tasks = parse(ENV_MAX_TASKS, &raw)?;
        }
        if let Some(raw) = optional(ENV_LEASE_MS) {
            config.lease_ms = parse(ENV_LEASE_MS, &raw)?;
        }
        if let Some(raw) = optional(ENV_HEARTBEAT_MS) {
            config.heartbeat_ms = parse(ENV_HEARTBEAT_MS, &raw)?;
        }
        if let Some(format) = optional(ENV_LOG_FORMAT) {
            config.log_format = format;
        }
        if let Some(level) = optional(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        Ok(config)
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}
