//! Collaborators for hosts without an application runtime.

use serde_json::Value;
use tracing::debug;

use crate::lifecycle::InitBarrier;

use super::{AppBootstrap, AppFacade, AppStatus, HostError, MethodInvoker};

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

/// Bootstrap that is complete from the start.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateBootstrap;

impl AppBootstrap for ImmediateBootstrap {
    fn wait_until_ready(&self) -> Result<(), HostError> {
        Ok(())
    }
}

/// Bootstrap completed explicitly by the host through
/// [`BootstrapLatch::mark_ready`].
#[derive(Debug, Default)]
pub struct BootstrapLatch {
    gate: InitBarrier,
}

impl BootstrapLatch {
    /// Builds an unfinished latch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks bootstrap as complete, waking the startup sequence.
    pub fn mark_ready(&self) {
        self.gate.release();
    }

    /// Marks bootstrap as failed.
    pub fn mark_failed(&self) {
        self.gate.abandon();
    }
}

impl AppBootstrap for BootstrapLatch {
    fn wait_until_ready(&self) -> Result<(), HostError> {
        self.gate
            .wait()
            .map_err(|error| HostError::new(format!("bootstrap did not complete: {error}")))
    }
}

/// Application facade for a host with nothing to reset or reload.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessApp;

impl AppFacade for HeadlessApp {
    fn reset_to_clean_state(&self) -> Result<(), HostError> {
        debug!(target: HOST_TARGET, "nothing to reset");
        Ok(())
    }

    fn await_idle(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn reload(&self) -> Result<(), HostError> {
        debug!(target: HOST_TARGET, "nothing to reload");
        Ok(())
    }

    fn status(&self) -> Result<AppStatus, HostError> {
        Ok(AppStatus::idle())
    }
}

/// Invoker for hosts that expose no invocable methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedInvoker;

impl MethodInvoker for UnsupportedInvoker {
    fn invoke(&self, _payload: &str) -> Result<Value, HostError> {
        Err(HostError::Unsupported("invoke"))
    }
}
