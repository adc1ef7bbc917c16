mod echo;
pub use echo::EchoExecutor;

mod lan_scan;
pub use lan_scan::{LanScanExecutor, NetProber, Prober};
