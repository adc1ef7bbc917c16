mod domain;
pub use domain::*;

mod kind;
pub use kind::{LanScanTarget, Task, TaskKind};

mod wire;
pub use wire::*;
