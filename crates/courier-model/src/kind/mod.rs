mod task;
pub use task::{LanScanTarget, Task, TaskKind};
