pub mod agent;
pub use agent::{AgentConfig, RunnerAgent, RuntimeMode};
pub mod backoff;
pub use backoff::IdleBackoff;
pub mod config;
pub use config::{ConfigError, RunnerConfig};
pub mod executor;
pub use executor::{ExecContext, ExecError, Executor, ExecutorRouter};
pub mod identity;
pub use identity::IdentityProvider;
pub mod orchestrator;
pub use orchestrator::{Orchestrator, OrchestratorError};
