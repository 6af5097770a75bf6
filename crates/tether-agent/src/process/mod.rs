use std::time::Duration;

mod errors;
pub(crate) mod launch;
pub(crate) mod loader;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use launch::{AgentOutcome, run_agent};
pub use loader::{ConfigLoader, StaticConfigLoader, SystemConfigLoader};
pub use shutdown::{
    ShutdownCallback, ShutdownError, ShutdownGuard, ShutdownSignal, SystemShutdownSignal,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
/// How often the run loop refreshes the heartbeat while waiting for the
/// agent to stop.
pub(crate) const SUPERVISE_INTERVAL: Duration = Duration::from_millis(250);
