//! Persistent runner daemon: leases, executes and heartbeats until the
//! process is told to stop.
//!
//! Exit code 0 on graceful shutdown, 1 on fatal configuration errors or an
//! unhandled error escaping the main loop.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use courier_client::OrchestratorClient;
use courier_core::{
    AgentConfig, ExecutorRouter, IdentityProvider, RunnerAgent, RunnerConfig, RuntimeMode,
};
use courier_exec::{EchoExecutor, LanScanExecutor};
use courier_observe::{LoggerConfig, logger_init};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RunnerConfig::from_env().context("runner configuration")?;

    let logger = LoggerConfig::from_settings(&config.log_format, &config.log_level)?;
    logger_init(&logger)?;

    let identity = IdentityProvider::system().identity(config.labels.clone());
    info!(runner_id = %identity.id, "runner identity resolved");

    let client = Arc::new(OrchestratorClient::from_config(&config)?);

    let mut router = ExecutorRouter::new();
    router.register(Arc::new(EchoExecutor));
    router.register(Arc::new(LanScanExecutor::new()));

    let agent = RunnerAgent::new(
        client,
        router,
        identity,
        RuntimeMode::Daemon,
        AgentConfig::from(&config),
    );

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            on_signal.cancel();
        }
    });

    agent.run(shutdown).await;
    Ok(())
}
