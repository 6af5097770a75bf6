//! Test double for [`HealthReporter`] that records structured events for
//! assertions.

use std::sync::Mutex;

use crate::dispatch::DispatchError;
use crate::health::{HealthReporter, StartupStep};
use crate::lifecycle::StartupError;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    ControllerInert,
    StartupStep(StartupStep),
    StartupFailed(String),
    Ready(Vec<String>),
    CommandUnmatched(String),
    CommandFailed { command: String, message: String },
    TeardownStarted,
    TeardownSkipped,
    TeardownCompleted,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn count(&self, event: &HealthEvent) -> usize {
        self.events()
            .iter()
            .filter(|recorded| *recorded == event)
            .count()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn controller_inert(&self) {
        self.record(HealthEvent::ControllerInert);
    }

    fn startup_step(&self, step: StartupStep) {
        self.record(HealthEvent::StartupStep(step));
    }

    fn startup_failed(&self, error: &StartupError) {
        self.record(HealthEvent::StartupFailed(error.to_string()));
    }

    fn ready(&self, commands: &[String]) {
        self.record(HealthEvent::Ready(commands.to_vec()));
    }

    fn command_unmatched(&self, command_type: &str) {
        self.record(HealthEvent::CommandUnmatched(command_type.to_owned()));
    }

    fn command_failed(&self, command_type: &str, error: &DispatchError) {
        self.record(HealthEvent::CommandFailed {
            command: command_type.to_owned(),
            message: error.to_string(),
        });
    }

    fn teardown_started(&self) {
        self.record(HealthEvent::TeardownStarted);
    }

    fn teardown_skipped(&self) {
        self.record(HealthEvent::TeardownSkipped);
    }

    fn teardown_completed(&self) {
        self.record(HealthEvent::TeardownCompleted);
    }
}
