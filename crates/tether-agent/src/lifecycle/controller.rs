//! Lifecycle controller: startup ordering, gated dispatch and teardown.
//!
//! Every transport event and every internal sequence runs as a work item on
//! a two-worker pool. Startup connects the transport, attaches crash and hang
//! reporting, waits for the host to bootstrap, builds the handler registry and
//! only then releases the barrier that command work items wait on. Teardown
//! runs at most once no matter how many stop requests arrive; a startup that
//! finds teardown already begun releases what it acquired and gives up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use tether_config::{Config, ServerUrlParseError};

use crate::dispatch::{Command, CommandRouter, Routed, SharedRegistry};
use crate::handlers::{self, HandlerContext, StopRequester};
use crate::health::{HealthReporter, StartupStep};
use crate::host::HostServices;
use crate::identity::SessionIdentity;
use crate::pool::WorkerPool;
use crate::transport::{Transport, TransportEvents, TransportFactory};

use super::{ControllerError, InitBarrier, LIFECYCLE_TARGET, LifecycleState, StartupError};

/// Prefix of worker thread names.
pub const WORKER_PREFIX: &str = "tether";
/// Number of workers draining the work queue.
pub const WORKER_COUNT: usize = 2;

/// Collaborators the controller is built from.
#[derive(Clone)]
pub struct ControllerDeps {
    /// Host application collaborators.
    pub host: HostServices,
    /// Builds the transport on `start`.
    pub transports: Arc<dyn TransportFactory>,
    /// Receives lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
}

/// Drives the agent through its lifecycle.
///
/// Cheap to clone; clones share the same agent.
#[derive(Clone)]
pub struct LifecycleController {
    core: Arc<Core>,
}

struct Core {
    identity: Option<SessionIdentity>,
    deps: ControllerDeps,
    started: AtomicBool,
    runtime: OnceLock<Runtime>,
    this: Weak<Core>,
}

struct Runtime {
    pool: WorkerPool,
    barrier: Arc<InitBarrier>,
    registry: Arc<SharedRegistry>,
    router: CommandRouter,
    state: Mutex<LifecycleState>,
    stopping: AtomicBool,
    transport: Arc<dyn Transport>,
}

impl Runtime {
    fn new(pool: WorkerPool, transport: Arc<dyn Transport>) -> Self {
        let barrier = Arc::new(InitBarrier::new());
        let registry = Arc::new(SharedRegistry::default());
        let router = CommandRouter::new(Arc::clone(&barrier), Arc::clone(&registry));
        Self {
            pool,
            barrier,
            registry,
            router,
            state: Mutex::new(LifecycleState::Unstarted),
            stopping: AtomicBool::new(false),
            transport,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, next: LifecycleState) {
        let mut state = self.lock_state();
        match state.transition(next) {
            Ok(updated) => *state = updated,
            Err(error) => warn!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "ignoring lifecycle transition"
            ),
        }
    }
}

impl LifecycleController {
    /// Builds a controller. Without an identity the controller is inert.
    #[must_use]
    pub fn new(identity: Option<SessionIdentity>, deps: ControllerDeps) -> Self {
        let core = Arc::new_cyclic(|this| Core {
            identity,
            deps,
            started: AtomicBool::new(false),
            runtime: OnceLock::new(),
            this: Weak::clone(this),
        });
        Self { core }
    }

    /// Builds a controller for the session named in `config`.
    pub fn from_config(config: &Config, deps: ControllerDeps) -> Result<Self, ServerUrlParseError> {
        let identity = SessionIdentity::from_config(config)?;
        Ok(Self::new(identity, deps))
    }

    /// Creates the transport and worker pool and queues the startup sequence.
    ///
    /// Does nothing on an inert controller.
    pub fn start(&self) -> Result<(), ControllerError> {
        let Some(identity) = self.core.identity.clone() else {
            self.core.deps.reporter.controller_inert();
            return Ok(());
        };
        if self.core.started.swap(true, Ordering::SeqCst) {
            return Err(ControllerError::AlreadyStarted);
        }

        let events: Arc<dyn TransportEvents> = Arc::new(CoreHandle {
            core: Weak::clone(&self.core.this),
        });
        let transport = self.core.deps.transports.create(events);
        let pool = WorkerPool::new(WORKER_PREFIX, WORKER_COUNT)?;
        if self.core.runtime.set(Runtime::new(pool, transport)).is_err() {
            return Err(ControllerError::AlreadyStarted);
        }
        let Some(runtime) = self.core.runtime.get() else {
            return Err(ControllerError::AlreadyStarted);
        };

        runtime.advance(LifecycleState::Starting);
        debug!(
            target: LIFECYCLE_TARGET,
            server = %identity.server(),
            session = identity.session_id(),
            "queueing startup"
        );
        let core = Arc::clone(&self.core);
        runtime.pool.execute(move || core.run_startup(&identity))?;
        Ok(())
    }

    /// Queues teardown and stops accepting new work. Idempotent.
    pub fn stop(&self) {
        self.core.request_stop();
    }

    /// Waits up to `timeout` for all queued work to finish after a stop.
    ///
    /// Returns `true` when the pool terminated or was never created.
    pub fn join(&self, timeout: Duration) -> bool {
        self.core
            .runtime
            .get()
            .is_none_or(|runtime| runtime.pool.await_termination(timeout))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.core
            .runtime
            .get()
            .map_or(LifecycleState::Unstarted, |runtime| *runtime.lock_state())
    }

    /// Command types of the published registry, sorted.
    #[must_use]
    pub fn registered_commands(&self) -> Vec<String> {
        self.core
            .runtime
            .get()
            .map(|runtime| runtime.registry.command_types())
            .unwrap_or_default()
    }

    /// Whether no session is configured.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.core.identity.is_none()
    }
}

impl Core {
    fn reporter(&self) -> &dyn HealthReporter {
        self.deps.reporter.as_ref()
    }

    fn run_startup(&self, identity: &SessionIdentity) {
        let Some(runtime) = self.runtime.get() else {
            return;
        };
        let reporter = self.reporter();
        let host = &self.deps.host;
        if self.superseded(runtime) {
            return;
        }

        reporter.startup_step(StartupStep::ConnectTransport);
        let connected = runtime
            .transport
            .connect(identity.server(), identity.session_id());
        if self.superseded(runtime) {
            return;
        }
        if let Err(error) = connected {
            self.abort_startup(&StartupError::Connect(error));
            return;
        }

        reporter.startup_step(StartupStep::AttachCrashHandler);
        host.crash_handler.attach(Arc::clone(&runtime.transport));
        if self.superseded(runtime) {
            return;
        }

        reporter.startup_step(StartupStep::AttachHangDetector);
        host.hang_detector.attach(Arc::clone(&runtime.transport));
        if self.superseded(runtime) {
            return;
        }

        reporter.startup_step(StartupStep::AwaitAppBootstrap);
        let bootstrapped = host.bootstrap.wait_until_ready();
        if self.superseded(runtime) {
            return;
        }
        if let Err(error) = bootstrapped {
            self.abort_startup(&StartupError::Bootstrap(error));
            return;
        }

        reporter.startup_step(StartupStep::BuildRegistry);
        let registry = handlers::build_registry(&HandlerContext {
            transport: Arc::clone(&runtime.transport),
            host: host.clone(),
            stop: Arc::new(CoreHandle {
                core: Weak::clone(&self.this),
            }),
        });

        reporter.startup_step(StartupStep::ReleaseBarrier);
        let mut state = runtime.lock_state();
        if *state != LifecycleState::Starting || runtime.stopping.load(Ordering::SeqCst) {
            let observed = *state;
            drop(state);
            self.release_session(runtime);
            reporter.startup_failed(&StartupError::Superseded { state: observed });
            return;
        }
        let commands = registry.command_types();
        runtime.registry.install(registry);
        runtime.barrier.release();
        *state = LifecycleState::Ready;
        drop(state);
        reporter.ready(&commands);
    }

    /// Abandons startup once teardown has begun, releasing anything a step
    /// acquired after teardown released the session.
    fn superseded(&self, runtime: &Runtime) -> bool {
        if !runtime.stopping.load(Ordering::SeqCst) {
            return false;
        }
        self.release_session(runtime);
        let state = *runtime.lock_state();
        self.reporter().startup_failed(&StartupError::Superseded { state });
        true
    }

    /// Detaches crash and hang reporting, then closes the transport.
    fn release_session(&self, runtime: &Runtime) {
        self.deps.host.crash_handler.detach();
        self.deps.host.hang_detector.detach();
        runtime.transport.close();
    }

    fn abort_startup(&self, error: &StartupError) {
        self.reporter().startup_failed(error);
        self.request_stop();
    }

    fn schedule_command(&self, command: Command) {
        let Some(runtime) = self.runtime.get() else {
            return;
        };
        let router = runtime.router.clone();
        let reporter = Arc::clone(&self.deps.reporter);
        let kind = command.kind().to_owned();
        let scheduled = runtime.pool.execute(move || match router.route(&command) {
            Ok(Routed::Handled) => {}
            Ok(Routed::Unmatched) => reporter.command_unmatched(command.kind()),
            Err(error) => reporter.command_failed(command.kind(), &error),
        });
        if let Err(error) = scheduled {
            debug!(
                target: LIFECYCLE_TARGET,
                command = kind,
                error = %error,
                "command dropped"
            );
        }
    }

    fn request_stop(&self) {
        let Some(runtime) = self.runtime.get() else {
            return;
        };
        let Some(core) = self.this.upgrade() else {
            return;
        };
        if let Err(error) = runtime.pool.execute(move || core.teardown()) {
            debug!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "teardown already scheduled"
            );
        }
        runtime.pool.shutdown();
    }

    fn teardown(&self) {
        let Some(runtime) = self.runtime.get() else {
            return;
        };
        if runtime.stopping.swap(true, Ordering::SeqCst) {
            self.reporter().teardown_skipped();
            return;
        }
        self.reporter().teardown_started();
        runtime.advance(LifecycleState::Stopping);
        if let Err(error) = self.deps.host.app.reset_to_clean_state() {
            warn!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "failed to reset host application"
            );
        }
        runtime.registry.clear();
        runtime.barrier.abandon();
        self.release_session(runtime);
        runtime.advance(LifecycleState::Stopped);
        self.reporter().teardown_completed();
    }
}

/// Weak handle given to the transport and the cleanup handler.
struct CoreHandle {
    core: Weak<Core>,
}

impl TransportEvents for CoreHandle {
    fn on_connected(&self) {
        if let Some(core) = self.core.upgrade() {
            core.schedule_command(Command::readiness());
        }
    }

    fn on_command(&self, command: Command) {
        if let Some(core) = self.core.upgrade() {
            core.schedule_command(command);
        }
    }

    fn on_closed(&self) {
        if let Some(core) = self.core.upgrade() {
            core.request_stop();
        }
    }
}

impl StopRequester for CoreHandle {
    fn request_stop(&self) {
        if let Some(core) = self.core.upgrade() {
            core.request_stop();
        }
    }
}
