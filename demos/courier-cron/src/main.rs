//! One-shot runner for invocation-bounded environments (cron ticks,
//! scheduled functions). Leases a single batch, executes it without any
//! background timers, and exits.
//!
//! Lease TTL (`COURIER_LEASE_MS`) must be sized to outlast the worst-case
//! batch: there is no heartbeat extension in this mode.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use courier_client::OrchestratorClient;
use courier_core::{
    AgentConfig, ExecutorRouter, IdentityProvider, RunnerAgent, RunnerConfig, RuntimeMode,
};
use courier_exec::{EchoExecutor, LanScanExecutor};
use courier_observe::{LoggerConfig, logger_init};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = RunnerConfig::from_env().context("runner configuration")?;

    let logger = LoggerConfig::from_settings(&config.log_format, &config.log_level)?;
    logger_init(&logger)?;

    let identity = IdentityProvider::system().identity(config.labels.clone());
    let client = Arc::new(OrchestratorClient::from_config(&config)?);

    let mut router = ExecutorRouter::new();
    router.register(Arc::new(EchoExecutor));
    router.register(Arc::new(LanScanExecutor::new()));

    let agent = RunnerAgent::new(
        client,
        router,
        identity,
        RuntimeMode::OneShot,
        AgentConfig::from(&config),
    );

    let processed = agent.run_once().await?;
    info!(processed, "batch complete");
    Ok(())
}
