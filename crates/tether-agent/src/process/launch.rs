//! Supervises agent launch and the run loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use tether_config::DEFAULT_JOIN_TIMEOUT;

use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::host::{Heartbeat, HostServices};
use crate::lifecycle::{ControllerDeps, LifecycleController};
use crate::telemetry;
use crate::transport::{TransportFactory, WebSocketTransportFactory};

use super::errors::LaunchError;
use super::loader::{ConfigLoader, SystemConfigLoader};
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{PROCESS_TARGET, SUPERVISE_INTERVAL};

/// How the agent run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentOutcome {
    /// No session was configured; nothing ran.
    Inert,
    /// The agent ran and stopped.
    Stopped,
    /// The agent was still running when the join timeout expired.
    JoinTimedOut,
}

/// Process-level collaborators.
pub(crate) struct ProcessControl<S> {
    pub(crate) shutdown: S,
    pub(crate) heartbeat: Heartbeat,
    pub(crate) join_timeout: Duration,
}

/// Service dependencies required to construct the agent.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) transports: Arc<dyn TransportFactory>,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to launch the agent.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) process: ProcessControl<S>,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the agent using the production collaborators.
pub fn run_agent() -> Result<AgentOutcome, LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            shutdown: SystemShutdownSignal,
            heartbeat: Heartbeat::new(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        },
        services: ServiceDeps {
            loader: SystemConfigLoader::new(),
            transports: Arc::new(WebSocketTransportFactory),
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    };
    run_agent_with(plan)
}

/// Runs the agent with injected collaborators.
///
/// Blocks until the agent stops: after a `cleanup` command, a closed
/// connection, a failed startup or a shutdown signal.
pub(crate) fn run_agent_with<L, S>(plan: LaunchPlan<L, S>) -> Result<AgentOutcome, LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl {
        shutdown,
        heartbeat,
        join_timeout,
    } = process;
    let ServiceDeps {
        loader,
        transports,
        reporter,
    } = services;

    let config = loader.load()?;
    let log_format = telemetry::initialise(&config)?;
    info!(
        target: PROCESS_TARGET,
        log_format = %log_format,
        "starting agent"
    );

    let host = HostServices::headless(heartbeat.clone(), config.hang_threshold());
    let controller = LifecycleController::from_config(
        &config,
        ControllerDeps {
            host,
            transports,
            reporter,
        },
    )?;
    controller.start()?;
    if controller.is_inert() {
        return Ok(AgentOutcome::Inert);
    }

    let stopper = controller.clone();
    let guard = shutdown.listen(Box::new(move || stopper.stop()))?;
    let deadline = Instant::now().checked_add(join_timeout);
    let mut outcome = AgentOutcome::Stopped;
    while !controller.join(SUPERVISE_INTERVAL) {
        heartbeat.beat();
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!(
                target: PROCESS_TARGET,
                timeout_secs = join_timeout.as_secs(),
                "agent did not stop before the join timeout"
            );
            controller.stop();
            outcome = AgentOutcome::JoinTimedOut;
            break;
        }
    }
    guard.close();
    info!(
        target: PROCESS_TARGET,
        state = %controller.state(),
        "agent exited"
    );
    Ok(outcome)
}
