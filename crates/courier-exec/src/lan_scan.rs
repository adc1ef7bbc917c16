use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use courier_core::{ExecContext, ExecError, Executor};
use courier_model::{HostInventory, InventoryRequest, LanScanTarget, Task, TaskKind};

/// Ports whose presence marks a host as remotely manageable and bumps its
/// score: ssh, telnet, rdp, vnc, winrm.
const MANAGEMENT_PORTS: [u16; 5] = [22, 23, 3389, 5900, 5985];
const MANAGEMENT_BONUS: u32 = 5;

/// Network probe primitives behind a seam so tests can simulate a subnet.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Short-timeout liveness check for one candidate address.
    async fn is_alive(&self, ip: Ipv4Addr) -> bool;
    /// TCP connect probe for one port on a responsive host.
    async fn port_open(&self, ip: Ipv4Addr, port: u16) -> bool;
}

/// TCP-connect prober. A connection refused still proves the host is up;
/// only a timeout or an unreachable network counts as dead.
pub struct NetProber {
    ping_timeout: Duration,
    port_timeout: Duration,
    liveness_ports: Vec<u16>,
}

impl Default for NetProber {
    fn default() -> Self {
        Self {
            ping_timeout: Duration::from_millis(300),
            port_timeout: Duration::from_millis(500),
            liveness_ports: vec![80, 443, 22, 445],
        }
    }
}

impl NetProber {
    async fn try_connect(&self, ip: Ipv4Addr, port: u16, timeout: Duration) -> ConnectOutcome {
        match tokio::time::timeout(timeout, TcpStream::connect((ip, port))).await {
            Ok(Ok(_)) => ConnectOutcome::Open,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                ConnectOutcome::Refused
            }
            Ok(Err(_)) | Err(_) => ConnectOutcome::Silent,
        }
    }
}

enum ConnectOutcome {
    Open,
    Refused,
    Silent,
}

#[async_trait]
impl Prober for NetProber {
    async fn is_alive(&self, ip: Ipv4Addr) -> bool {
        for &port in &self.liveness_ports {
            match self.try_connect(ip, port, self.ping_timeout).await {
                ConnectOutcome::Open | ConnectOutcome::Refused => return true,
                ConnectOutcome::Silent => {}
            }
        }
        false
    }

    async fn port_open(&self, ip: Ipv4Addr, port: u16) -> bool {
        matches!(
            self.try_connect(ip, port, self.port_timeout).await,
            ConnectOutcome::Open
        )
    }
}

/// Sweeps a `/24` range: concurrent liveness probes over every candidate,
/// then concurrent port probes per responsive host, then a score per host.
/// The inventory is submitted to the orchestrator before the terminal
/// result is reported.
pub struct LanScanExecutor {
    prober: Arc<dyn Prober>,
}

impl LanScanExecutor {
    pub fn new() -> Self {
        Self {
            prober: Arc::new(NetProber::default()),
        }
    }

    pub fn with_prober(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    async fn sweep(&self, target: &LanScanTarget) -> Result<Vec<HostInventory>, ExecError> {
        let candidates = expand_cidr(&target.cidr)?;

        // all 254 liveness probes in flight at once; /24 is the supported
        // ceiling, so no concurrency cap
        let alive: Vec<Ipv4Addr> = join_all(candidates.iter().map(|&ip| {
            let prober = Arc::clone(&self.prober);
            async move { prober.is_alive(ip).await.then_some(ip) }
        }))
        .await
        .into_iter()
        .flatten()
        .collect();

        debug!(candidates = candidates.len(), alive = alive.len(), "liveness sweep done");

        let hosts = join_all(alive.iter().map(|&ip| {
            let prober = Arc::clone(&self.prober);
            let ports = target.ports.clone();
            async move {
                let open: Vec<u16> = join_all(ports.iter().map(|&port| {
                    let prober = Arc::clone(&prober);
                    async move { prober.port_open(ip, port).await.then_some(port) }
                }))
                .await
                .into_iter()
                .flatten()
                .collect();

                HostInventory {
                    ip: ip.to_string(),
                    score: score(&open),
                    ports: open,
                }
            }
        }))
        .await;

        Ok(hosts)
    }
}

impl Default for LanScanExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for LanScanExecutor {
    fn name(&self) -> &'static str {
        "lan-scan"
    }

    fn supports(&self, kind: &TaskKind) -> bool {
        matches!(kind, TaskKind::LanScan(_))
    }

    async fn execute(
        &self,
        ctx: &ExecContext<'_>,
        task: &Task,
    ) -> Result<serde_json::Value, ExecError> {
        let TaskKind::LanScan(target) = &task.kind else {
            return Err(ExecError::Unsupported("not a lan-scan task".to_string()));
        };

        let hosts = self.sweep(target).await?;

        let inventory = InventoryRequest {
            runner_id: ctx.runner_id.to_string(),
            lease_id: task.lease_id.clone(),
            task_id: task.id.clone(),
            hosts: hosts.clone(),
        };
        if let Err(e) = ctx.orchestrator.submit_inventory(&inventory).await {
            warn!(error = %e, "inventory submission failed");
        }

        Ok(serde_json::json!({
            "cidr": target.cidr,
            "hostsAlive": hosts.len(),
            "hosts": hosts,
        }))
    }
}

/// Expands a `/24` CIDR into its 254 host addresses.
///
/// Any other prefix length is rejected; sweeping it with /24 assumptions
/// would silently mis-scan.
fn expand_cidr(cidr: &str) -> Result<Vec<Ipv4Addr>, ExecError> {
    let (base, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| ExecError::Unsupported(format!("invalid CIDR: {cidr}")))?;

    let prefix: u8 = prefix
        .parse()
        .map_err(|_| ExecError::Unsupported(format!("invalid CIDR prefix: {cidr}")))?;
    if prefix != 24 {
        warn!(cidr, "only /24 ranges are supported");
        return Err(ExecError::Unsupported(format!(
            "only /24 ranges are supported, got /{prefix}"
        )));
    }

    let base: Ipv4Addr = base
        .parse()
        .map_err(|_| ExecError::Unsupported(format!("invalid CIDR base address: {cidr}")))?;
    let [a, b, c, _] = base.octets();

    Ok((1..=254).map(|host| Ipv4Addr::new(a, b, c, host)).collect())
}

fn score(open_ports: &[u16]) -> u32 {
    let base = open_ports.len() as u32;
    let managed = open_ports.iter().any(|p| MANAGEMENT_PORTS.contains(p));
    base + if managed { MANAGEMENT_BONUS } else { 0 }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use courier_core::{Orchestrator, OrchestratorError};
    use courier_model::{
        Ack, Health, HeartbeatRequest, LeaseRequest, LeaseResponse, RegisterRequest, ResultRequest,
    };

    use super::*;

    #[test]
    fn expands_a_24_to_exactly_254_hosts() {
        let hosts = expand_cidr("10.0.0.0/24").unwrap();

        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts[0], Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(hosts[253], Ipv4Addr::new(10, 0, 0, 254));
    }

    #[test]
    fn rejects_non_24_prefixes() {
        assert!(expand_cidr("10.0.0.0/16").is_err());
        assert!(expand_cidr("10.0.0.0/25").is_err());
        assert!(expand_cidr("10.0.0.0").is_err());
        assert!(expand_cidr("not-an-address/24").is_err());
    }

    #[test]
    fn management_ports_raise_the_score() {
        assert_eq!(score(&[]), 0);
        assert_eq!(score(&[80]), 1);
        assert_eq!(score(&[22]), 6);
        assert_eq!(score(&[22, 80]), 7);
    }

    /// Simulated subnet: one host answers, one port is open.
    struct OneHostResponder {
        host: Ipv4Addr,
        port: u16,
    }

    #[async_trait]
    impl Prober for OneHostResponder {
        async fn is_alive(&self, ip: Ipv4Addr) -> bool {
            ip == self.host
        }

        async fn port_open(&self, ip: Ipv4Addr, port: u16) -> bool {
            ip == self.host && port == self.port
        }
    }

    #[derive(Default)]
    struct CapturingOrchestrator {
        inventories: Mutex<Vec<InventoryRequest>>,
    }

    #[async_trait]
    impl Orchestrator for CapturingOrchestrator {
        async fn register(&self, _req: &RegisterRequest) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn lease(&self, _req: &LeaseRequest) -> Result<LeaseResponse, OrchestratorError> {
            Ok(LeaseResponse {
                leased: vec![],
                backoff_ms: None,
            })
        }
        async fn heartbeat(&self, _req: &HeartbeatRequest) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn report(&self, _req: &ResultRequest) -> Result<Ack, OrchestratorError> {
            Ok(Ack { ok: true })
        }
        async fn submit_inventory(
            &self,
            req: &InventoryRequest,
        ) -> Result<Ack, OrchestratorError> {
            self.inventories.lock().unwrap().push(req.clone());
            Ok(Ack { ok: true })
        }
        async fn health(&self) -> Result<Health, OrchestratorError> {
            Ok(Health { ok: true })
        }
    }

    fn scan_task() -> Task {
        Task {
            id: "t1".to_string(),
            lease_id: "l1".to_string(),
            kind: TaskKind::LanScan(LanScanTarget {
                cidr: "10.0.0.0/24".to_string(),
                ports: vec![22, 80],
            }),
        }
    }

    #[tokio::test]
    async fn sweep_submits_inventory_for_the_single_responder() {
        let orchestrator = CapturingOrchestrator::default();
        let ctx = ExecContext {
            orchestrator: &orchestrator,
            runner_id: "r1",
        };
        let executor = LanScanExecutor::with_prober(Arc::new(OneHostResponder {
            host: Ipv4Addr::new(10, 0, 0, 5),
            port: 22,
        }));

        let result = executor.execute(&ctx, &scan_task()).await.unwrap();

        let inventories = orchestrator.inventories.lock().unwrap();
        assert_eq!(inventories.len(), 1);
        assert_eq!(inventories[0].lease_id, "l1");
        assert_eq!(inventories[0].task_id, "t1");

        let hosts = &inventories[0].hosts;
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].ip, "10.0.0.5");
        assert_eq!(hosts[0].ports, vec![22]);
        assert_eq!(hosts[0].score, 6);

        assert_eq!(result["hostsAlive"], 1);
    }

    #[tokio::test]
    async fn bad_cidr_fails_the_task_before_any_probe() {
        let orchestrator = CapturingOrchestrator::default();
        let ctx = ExecContext {
            orchestrator: &orchestrator,
            runner_id: "r1",
        };
        let executor = LanScanExecutor::with_prober(Arc::new(OneHostResponder {
            host: Ipv4Addr::new(10, 0, 0, 5),
            port: 22,
        }));

        let mut task = scan_task();
        task.kind = TaskKind::LanScan(LanScanTarget {
            cidr: "10.0.0.0/16".to_string(),
            ports: vec![22],
        });

        let err = executor.execute(&ctx, &task).await.unwrap_err();
        assert!(err.to_string().contains("/24"));
        assert!(orchestrator.inventories.lock().unwrap().is_empty());
    }
}
