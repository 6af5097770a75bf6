//! Host collaborator doubles that write to the shared journal.

use std::sync::Arc;

use serde_json::Value;

use crate::host::{
    AppBootstrap, AppFacade, AppStatus, BootstrapLatch, CrashHandler, HangDetector, HostError,
    HostServices, Instruments, MethodInvoker, RecordingState,
};
use crate::transport::Transport;

use super::journal::{Entry, Journal};

pub struct RecordingApp {
    journal: Journal,
    fail_status: bool,
}

impl AppFacade for RecordingApp {
    fn reset_to_clean_state(&self) -> Result<(), HostError> {
        self.journal.record(Entry::AppReset);
        Ok(())
    }

    fn await_idle(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn reload(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn status(&self) -> Result<AppStatus, HostError> {
        if self.fail_status {
            return Err(HostError::new("status unavailable"));
        }
        Ok(AppStatus::idle())
    }
}

/// Bootstrap that completes when the latch opens, journaling completion.
pub struct RecordingBootstrap {
    journal: Journal,
    latch: Option<Arc<BootstrapLatch>>,
}

impl AppBootstrap for RecordingBootstrap {
    fn wait_until_ready(&self) -> Result<(), HostError> {
        if let Some(latch) = &self.latch {
            latch.wait_until_ready()?;
        }
        self.journal.record(Entry::BootstrapCompleted);
        Ok(())
    }
}

pub struct RecordingCrashHandler {
    journal: Journal,
}

impl CrashHandler for RecordingCrashHandler {
    fn attach(&self, _transport: Arc<dyn Transport>) {
        self.journal.record(Entry::CrashHandlerAttached);
    }

    fn detach(&self) {
        self.journal.record(Entry::CrashHandlerDetached);
    }
}

pub struct RecordingHangDetector {
    journal: Journal,
}

impl HangDetector for RecordingHangDetector {
    fn attach(&self, _transport: Arc<dyn Transport>) {
        self.journal.record(Entry::HangDetectorAttached);
    }

    fn detach(&self) {
        self.journal.record(Entry::HangDetectorDetached);
    }
}

pub struct EchoInvoker;

impl MethodInvoker for EchoInvoker {
    fn invoke(&self, payload: &str) -> Result<Value, HostError> {
        serde_json::from_str(payload).map_err(|error| HostError::new(error.to_string()))
    }
}

pub struct StubInstruments {
    pub supported: bool,
}

impl Instruments for StubInstruments {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn set_recording_state(&self, _state: &RecordingState) -> Result<(), HostError> {
        Ok(())
    }

    fn record_event(&self, _payload: &str) -> Result<(), HostError> {
        Ok(())
    }
}

/// Knobs for [`recording_host`].
#[derive(Default)]
pub struct HostOptions {
    pub latch: Option<Arc<BootstrapLatch>>,
    pub instruments: Option<bool>,
    pub fail_status: bool,
}

pub fn recording_host(journal: &Journal, options: HostOptions) -> HostServices {
    HostServices {
        app: Arc::new(RecordingApp {
            journal: journal.clone(),
            fail_status: options.fail_status,
        }),
        bootstrap: Arc::new(RecordingBootstrap {
            journal: journal.clone(),
            latch: options.latch,
        }),
        invoker: Arc::new(EchoInvoker),
        crash_handler: Arc::new(RecordingCrashHandler {
            journal: journal.clone(),
        }),
        hang_detector: Arc::new(RecordingHangDetector {
            journal: journal.clone(),
        }),
        instruments: options.instruments.map(|supported| {
            Arc::new(StubInstruments { supported }) as Arc<dyn Instruments>
        }),
    }
}
