//! Collaborators supplied by the host application.
//!
//! The agent never implements application behaviour itself. Handlers and the
//! startup sequence call into these traits; [`HostServices`] bundles one
//! implementation of each.

mod crash;
mod hang;
mod headless;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::transport::Transport;

pub use self::crash::{CRASH_CORRELATION_ID, PanicCrashHandler, crash_report};
pub use self::hang::{HANG_CORRELATION_ID, Heartbeat, WatchdogHangDetector, hang_report};
pub use self::headless::{BootstrapLatch, HeadlessApp, ImmediateBootstrap, UnsupportedInvoker};

/// Failure reported by a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host attempted the operation and failed.
    #[error("{0}")]
    Failed(String),
    /// The host does not provide the operation.
    #[error("operation '{0}' is not supported by this host")]
    Unsupported(&'static str),
}

impl HostError {
    /// Builds a [`HostError::Failed`] from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Whether the host application is doing work the test should wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppActivity {
    /// Nothing pending.
    Idle,
    /// At least one resource is busy.
    Busy,
}

/// Snapshot returned by [`AppFacade::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    /// Overall activity.
    pub app_status: AppActivity,
    /// Names of busy resources, empty when idle.
    pub busy_resources: Vec<String>,
}

impl AppStatus {
    /// An idle snapshot.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            app_status: AppActivity::Idle,
            busy_resources: Vec::new(),
        }
    }
}

/// Parameters of a `setRecordingState` command.
///
/// An empty payload decodes to the default, which stops recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingState {
    /// Where to write the recording; absent to stop recording.
    #[serde(default)]
    pub recording_path: Option<String>,
    /// Sampling interval in milliseconds.
    #[serde(default)]
    pub sampling_interval: Option<u64>,
}

impl RecordingState {
    /// Decodes a command payload.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        if payload.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(payload)
    }
}

/// Control surface of the host application.
pub trait AppFacade: Send + Sync {
    /// Returns the application to a clean state during teardown.
    fn reset_to_clean_state(&self) -> Result<(), HostError>;

    /// Blocks until the application is idle.
    fn await_idle(&self) -> Result<(), HostError>;

    /// Reloads the application.
    fn reload(&self) -> Result<(), HostError>;

    /// Reports current activity.
    fn status(&self) -> Result<AppStatus, HostError>;
}

/// Signals when the host application has finished bootstrapping.
pub trait AppBootstrap: Send + Sync {
    /// Blocks until the application is ready to receive commands.
    fn wait_until_ready(&self) -> Result<(), HostError>;
}

/// Executes `invoke` payloads inside the host.
pub trait MethodInvoker: Send + Sync {
    /// Runs the invocation described by `payload` and returns its result.
    fn invoke(&self, payload: &str) -> Result<Value, HostError>;
}

/// Optional performance instrumentation.
pub trait Instruments: Send + Sync {
    /// Whether instrumentation works in this host. Consulted once per startup.
    fn is_supported(&self) -> bool;

    /// Starts or stops recording.
    fn set_recording_state(&self, state: &RecordingState) -> Result<(), HostError>;

    /// Records an instrumentation event.
    fn record_event(&self, payload: &str) -> Result<(), HostError>;
}

/// Reports fatal host failures over the transport.
pub trait CrashHandler: Send + Sync {
    /// Begins reporting through `transport`.
    fn attach(&self, transport: Arc<dyn Transport>);

    /// Stops reporting and releases the transport.
    fn detach(&self);
}

/// Reports an unresponsive host over the transport.
pub trait HangDetector: Send + Sync {
    /// Begins monitoring and reporting through `transport`.
    fn attach(&self, transport: Arc<dyn Transport>);

    /// Stops monitoring and releases the transport.
    fn detach(&self);
}

/// One implementation of every host collaborator.
#[derive(Clone)]
pub struct HostServices {
    /// Application control surface.
    pub app: Arc<dyn AppFacade>,
    /// Bootstrap completion signal.
    pub bootstrap: Arc<dyn AppBootstrap>,
    /// `invoke` executor.
    pub invoker: Arc<dyn MethodInvoker>,
    /// Crash reporter.
    pub crash_handler: Arc<dyn CrashHandler>,
    /// Hang reporter.
    pub hang_detector: Arc<dyn HangDetector>,
    /// Instrumentation subsystem, when the host has one.
    pub instruments: Option<Arc<dyn Instruments>>,
}

impl HostServices {
    /// Collaborators for a host without a UI runtime.
    ///
    /// The application is always idle, `invoke` is unsupported, panics are
    /// reported as crashes and `heartbeat` stalls longer than
    /// `hang_threshold` are reported as hangs.
    #[must_use]
    pub fn headless(heartbeat: Heartbeat, hang_threshold: Duration) -> Self {
        Self {
            app: Arc::new(HeadlessApp),
            bootstrap: Arc::new(ImmediateBootstrap),
            invoker: Arc::new(UnsupportedInvoker),
            crash_handler: Arc::new(PanicCrashHandler::default()),
            hang_detector: Arc::new(WatchdogHangDetector::new(heartbeat, hang_threshold)),
            instruments: None,
        }
    }

    /// Instrumentation, if present and supported.
    #[must_use]
    pub fn supported_instruments(&self) -> Option<Arc<dyn Instruments>> {
        self.instruments
            .as_ref()
            .filter(|instruments| instruments.is_supported())
            .cloned()
    }
}
