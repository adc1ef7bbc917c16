use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use courier_model::{
    HeartbeatRequest, LeaseRequest, RegisterRequest, ResultRequest, RunnerIdentity, Task,
    TaskReport,
};

use crate::{
    backoff::IdleBackoff,
    config::RunnerConfig,
    executor::{ExecContext, ExecutorRouter},
    orchestrator::{Orchestrator, OrchestratorError},
};

/// How the hosting environment bounds this runner's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Long-lived process. Leases in a loop and heartbeats while executing.
    Daemon,
    /// Invocation-bounded environment (cron tick, scheduled function,
    /// serverless request). One lease batch, no background timers; lease
    /// TTL must be sized to outlast the worst-case batch.
    OneShot,
}

impl RuntimeMode {
    pub fn supports_heartbeat(&self) -> bool {
        matches!(self, RuntimeMode::Daemon)
    }
}

/// Lease-loop tuning knobs, independent of transport configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Upper bound on tasks requested per lease call.
    pub max_tasks: u32,
    /// Lease TTL requested per task, in milliseconds.
    pub lease_ms: u64,
    /// Heartbeat ticker period (daemon mode only).
    pub heartbeat_every: Duration,
    /// Lease extension requested by each heartbeat, in milliseconds.
    pub heartbeat_extend_ms: u64,
    pub backoff_floor: Duration,
    pub backoff_ceiling: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tasks: 1,
            lease_ms: 120_000,
            heartbeat_every: Duration::from_secs(20),
            heartbeat_extend_ms: 60_000,
            backoff_floor: Duration::from_millis(crate::backoff::DEFAULT_FLOOR_MS),
            backoff_ceiling: Duration::from_millis(crate::backoff::DEFAULT_CEILING_MS),
        }
    }
}

impl From<&RunnerConfig> for AgentConfig {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            max_tasks: config.max_tasks,
            lease_ms: config.lease_ms,
            heartbeat_every: Duration::from_millis(config.heartbeat_ms),
            heartbeat_extend_ms: config.heartbeat_extend_ms,
            backoff_floor: Duration::from_millis(config.backoff_floor_ms),
            backoff_ceiling: Duration::from_millis(config.backoff_ceiling_ms),
        }
    }
}

/// The runner's orchestrating state machine.
///
/// Registers once, then leases, executes and reports in a loop. Tasks are
/// processed strictly one at a time; a task's execution runs concurrently
/// only with its own heartbeat ticker, which is stopped exactly once via a
/// cancellation token before the result is submitted.
///
/// Heartbeat failures never stop execution: a task that overruns its lease
/// TTL while heartbeats are failing may be reassigned by the orchestrator
/// while this runner is still working on it. The orchestrator's rejection
/// of the eventual result call is the only signal of that.
pub struct RunnerAgent {
    orchestrator: Arc<dyn Orchestrator>,
    router: ExecutorRouter,
    identity: RunnerIdentity,
    mode: RuntimeMode,
    config: AgentConfig,
}

impl RunnerAgent {
    pub fn new(
        orchestrator: Arc<dyn Orchestrator>,
        router: ExecutorRouter,
        identity: RunnerIdentity,
        mode: RuntimeMode,
        config: AgentConfig,
    ) -> Self {
        Self {
            orchestrator,
            router,
            identity,
            mode,
            config,
        }
    }

    /// Daemon entry point: runs until `shutdown` is cancelled.
    ///
    /// Registration is retried through the idle backoff until it succeeds.
    /// Empty or failed lease polls back off; a non-empty batch is executed
    /// sequentially and followed by an immediate re-poll.
    pub async fn run(&self, shutdown: CancellationToken) {
        if !self.register_until_ready(&shutdown).await {
            return;
        }

        let mut backoff = IdleBackoff::new(self.config.backoff_floor, self.config.backoff_ceiling);

        while !shutdown.is_cancelled() {
            match self.orchestrator.lease(&self.lease_request()).await {
                Ok(resp) if resp.leased.is_empty() => {
                    let delay = backoff.on_idle(resp.backoff_ms);
                    debug!(delay_ms = delay.as_millis() as u64, "no work leased");
                    if !self.idle_wait(&shutdown, delay).await {
                        break;
                    }
                }
                Ok(resp) => {
                    backoff.on_work();
                    info!(count = resp.leased.len(), "leased tasks");
                    for task in &resp.leased {
                        if shutdown.is_cancelled() {
                            // remaining leases are reclaimed by TTL expiry
                            break;
                        }
                        self.process_task(task).await;
                    }
                    // work was just found; poll again without delay
                }
                Err(e) => {
                    warn!(error = %e, "lease request failed");
                    let delay = backoff.on_idle(None);
                    if !self.idle_wait(&shutdown, delay).await {
                        break;
                    }
                }
            }
        }

        info!(runner_id = %self.identity.id, "runner loop stopped");
    }

    /// One-shot entry point for invocation-bounded environments.
    ///
    /// Leases a single batch and executes it without heartbeat extension;
    /// the requested `lease_ms` is the only thing keeping the tasks
    /// exclusive. Returns the number of tasks processed.
    pub async fn run_once(&self) -> Result<usize, OrchestratorError> {
        self.orchestrator.register(&self.register_request()).await?;

        let resp = self.orchestrator.lease(&self.lease_request()).await?;
        if resp.leased.is_empty() {
            debug!("no work leased");
            return Ok(0);
        }

        for task in &resp.leased {
            self.process_task(task).await;
        }
        Ok(resp.leased.len())
    }

    #[instrument(
        skip(self, task),
        fields(task_id = %task.id, lease_id = %task.lease_id, kind = task.kind.kind())
    )]
    async fn process_task(&self, task: &Task) {
        let Some(executor) = self.router.pick(&task.kind) else {
            warn!("no executor for task kind; skipping, lease expires server-side");
            return;
        };

        let ticker = self
            .mode
            .supports_heartbeat()
            .then(|| self.spawn_heartbeat(task.lease_id.clone()));

        let ctx = ExecContext {
            orchestrator: self.orchestrator.as_ref(),
            runner_id: &self.identity.id,
        };
        let report = match executor.execute(&ctx, task).await {
            Ok(value) => TaskReport::succeeded(value),
            Err(e) => {
                warn!(error = %e, "task execution failed");
                TaskReport::failed(e.to_string())
            }
        };

        // The ticker observes the stop before the result leaves the runner.
        if let Some((stop, handle)) = ticker {
            stop.cancel();
            let _ = handle.await;
        }

        self.submit_report(task, report).await;
    }

    fn spawn_heartbeat(&self, lease_id: String) -> (CancellationToken, JoinHandle<()>) {
        let stop = CancellationToken::new();
        let observed = stop.clone();
        let orchestrator = Arc::clone(&self.orchestrator);
        let req = HeartbeatRequest {
            runner_id: self.identity.id.clone(),
            lease_id,
            extend_ms: self.config.heartbeat_extend_ms,
        };
        let every = self.config.heartbeat_every;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // the first tick is immediate; the lease was just granted
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = observed.cancelled() => break,
                    _ = interval.tick() => {
                        match orchestrator.heartbeat(&req).await {
                            Ok(_) => debug!(lease_id = %req.lease_id, "lease extended"),
                            Err(e) => {
                                warn!(error = %e, lease_id = %req.lease_id, "heartbeat failed; task continues")
                            }
                        }
                    }
                }
            }
        });

        (stop, handle)
    }

    async fn submit_report(&self, task: &Task, report: TaskReport) {
        let req = ResultRequest {
            runner_id: self.identity.id.clone(),
            lease_id: task.lease_id.clone(),
            task_id: task.id.clone(),
            status: report.status,
            result: report.result,
            error: report.error,
        };

        match self.orchestrator.report(&req).await {
            Ok(_) => info!(status = ?req.status, "result submitted"),
            Err(e) => {
                // no retry; the lease expires server-side and the
                // orchestrator decides what happens to the task
                warn!(error = %e, "result submission failed")
            }
        }
    }

    async fn register_until_ready(&self, shutdown: &CancellationToken) -> bool {
        let req = self.register_request();
        let mut backoff = IdleBackoff::new(self.config.backoff_floor, self.config.backoff_ceiling);

        loop {
            if shutdown.is_cancelled() {
                return false;
            }
            match self.orchestrator.register(&req).await {
                Ok(_) => {
                    info!(runner_id = %self.identity.id, "registered with orchestrator");
                    return true;
                }
                Err(e) => {
                    warn!(error = %e, "registration failed");
                    let delay = backoff.on_idle(None);
                    if !self.idle_wait(shutdown, delay).await {
                        return false;
                    }
                }
            }
        }
    }

    /// Sleeps for `delay` unless shutdown arrives first. Returns whether
    /// the loop should keep going.
    async fn idle_wait(&self, shutdown: &CancellationToken, delay: Duration) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            runner_id: self.identity.id.clone(),
            labels: self.identity.labels.clone(),
            meta: self.identity.meta.clone(),
        }
    }

    fn lease_request(&self) -> LeaseRequest {
        LeaseRequest {
            runner_id: self.identity.id.clone(),
            labels: self.identity.labels.clone(),
            max: self.config.max_tasks,
            lease_ms: self.config.lease_ms,
        }
    }
}
