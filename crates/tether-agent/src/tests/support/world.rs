//! Agent harness shared by unit and behavioural tests.

use std::sync::Arc;
use std::time::Duration;

use crate::host::BootstrapLatch;
use crate::identity::SessionIdentity;
use crate::lifecycle::{ControllerDeps, ControllerError, LifecycleController, LifecycleState};

use super::host::{HostOptions, recording_host};
use super::journal::{Entry, Journal, wait_until};
use super::reporter::{HealthEvent, RecordingHealthReporter};
use super::transport::{ConnectBehaviour, RecordingTransport, RecordingTransportFactory};

pub const SERVER: &str = "ws://h:1";
pub const SESSION: &str = "s1";

/// Builder for [`AgentHarness`].
#[derive(Default)]
pub struct HarnessOptions {
    pub configured: bool,
    pub gated_bootstrap: bool,
    pub instruments: Option<bool>,
    pub connect: ConnectBehaviour,
    pub fail_status: bool,
}

impl HarnessOptions {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }
}

/// A controller wired to recording doubles.
pub struct AgentHarness {
    pub controller: LifecycleController,
    pub journal: Journal,
    pub reporter: Arc<RecordingHealthReporter>,
    pub factory: Arc<RecordingTransportFactory>,
    pub latch: Arc<BootstrapLatch>,
}

impl AgentHarness {
    pub fn new(options: HarnessOptions) -> Self {
        let journal = Journal::default();
        let reporter = Arc::new(RecordingHealthReporter::default());
        let factory = Arc::new(RecordingTransportFactory::new(
            journal.clone(),
            options.connect,
        ));
        let latch = Arc::new(BootstrapLatch::new());
        let host = recording_host(
            &journal,
            HostOptions {
                latch: options.gated_bootstrap.then(|| Arc::clone(&latch)),
                instruments: options.instruments,
                fail_status: options.fail_status,
            },
        );
        let identity = options.configured.then(|| {
            SessionIdentity::new(SERVER.parse().expect("server url"), SESSION)
        });
        let controller = LifecycleController::new(
            identity,
            ControllerDeps {
                host,
                transports: factory.clone(),
                reporter: reporter.clone(),
            },
        );
        Self {
            controller,
            journal,
            reporter,
            factory,
            latch,
        }
    }

    pub fn start(&self) -> Result<(), ControllerError> {
        self.controller.start()
    }

    pub fn transport(&self) -> Arc<RecordingTransport> {
        self.factory.transport()
    }

    pub fn deliver(&self, kind: &str, payload: &str, correlation_id: i64) {
        self.transport().deliver(kind, payload, correlation_id);
    }

    pub fn wait_for_state(&self, state: LifecycleState) -> bool {
        wait_until(|| self.controller.state() == state)
    }

    pub fn wait_until_ready(&self) -> bool {
        self.wait_for_state(LifecycleState::Ready)
    }

    pub fn wait_for_reply(&self, kind: &str, correlation_id: i64) -> bool {
        self.journal.wait_for(&Entry::sent(kind, correlation_id))
    }

    pub fn wait_for_event(&self, event: &HealthEvent) -> bool {
        wait_until(|| self.reporter.events().contains(event))
    }

    pub fn stop_and_join(&self) -> bool {
        self.controller.stop();
        self.controller.join(Duration::from_secs(2))
    }
}

impl Drop for AgentHarness {
    fn drop(&mut self) {
        self.latch.mark_ready();
        self.controller.stop();
    }
}
