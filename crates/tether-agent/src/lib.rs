//! Remote command agent for test orchestration.
//!
//! The agent runs inside a host application, joins a session on an
//! orchestration server and executes the commands the server sends. Startup
//! is strictly ordered: the transport connects, crash and hang reporting are
//! attached to it, the host finishes bootstrapping, command handlers are
//! registered and only then are commands dispatched. Commands that arrive
//! earlier wait on an initialisation barrier instead of racing startup.
//!
//! All work runs on a small pool of named worker threads owned by the
//! [`LifecycleController`]. Shutdown is requested by a `cleanup` command, by
//! the server closing the connection or by the host; teardown runs once
//! regardless of how many of these arrive.
//!
//! Configuration comes from [`tether_config`]. Without a server address and
//! session id the controller stays inert and the agent does nothing.

pub mod dispatch;
pub mod handlers;
mod health;
pub mod host;
mod identity;
pub mod lifecycle;
mod pool;
mod process;
mod telemetry;
pub mod transport;

pub use health::{HealthReporter, StartupStep, StructuredHealthReporter};
pub use identity::SessionIdentity;
pub use lifecycle::{ControllerDeps, LifecycleController, LifecycleState};
pub use pool::{PoolError, WorkerPool};
pub use process::{
    AgentOutcome, ConfigLoader, LaunchError, ShutdownCallback, ShutdownError, ShutdownGuard,
    ShutdownSignal, StaticConfigLoader, SystemConfigLoader, SystemShutdownSignal, run_agent,
};
pub use telemetry::TelemetryError;

#[cfg(test)]
mod tests;
