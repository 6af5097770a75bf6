//! Structured health reporting for agent lifecycle events.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::DispatchError;
use crate::lifecycle::StartupError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Steps of the startup sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStep {
    /// Connecting to the orchestration server.
    ConnectTransport,
    /// Attaching the crash handler.
    AttachCrashHandler,
    /// Attaching the hang detector.
    AttachHangDetector,
    /// Waiting for host bootstrap.
    AwaitAppBootstrap,
    /// Building the handler registry.
    BuildRegistry,
    /// Publishing the registry and releasing the barrier.
    ReleaseBarrier,
}

impl fmt::Display for StartupStep {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConnectTransport => "connect_transport",
            Self::AttachCrashHandler => "attach_crash_handler",
            Self::AttachHangDetector => "attach_hang_detector",
            Self::AwaitAppBootstrap => "await_app_bootstrap",
            Self::BuildRegistry => "build_registry",
            Self::ReleaseBarrier => "release_barrier",
        };
        formatter.write_str(label)
    }
}

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// No session is configured; the controller will never start.
    fn controller_inert(&self);

    /// A startup step is about to run.
    fn startup_step(&self, step: StartupStep);

    /// Startup ended without releasing the barrier.
    fn startup_failed(&self, error: &StartupError);

    /// The barrier was released with `commands` registered.
    fn ready(&self, commands: &[String]);

    /// A command arrived for a type with no handler.
    fn command_unmatched(&self, command_type: &str);

    /// A command work item failed.
    fn command_failed(&self, command_type: &str, error: &DispatchError);

    /// The teardown body began.
    fn teardown_started(&self);

    /// A repeated stop request was ignored.
    fn teardown_skipped(&self);

    /// The teardown body finished.
    fn teardown_completed(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn controller_inert(&self) {
        (**self).controller_inert();
    }

    fn startup_step(&self, step: StartupStep) {
        (**self).startup_step(step);
    }

    fn startup_failed(&self, error: &StartupError) {
        (**self).startup_failed(error);
    }

    fn ready(&self, commands: &[String]) {
        (**self).ready(commands);
    }

    fn command_unmatched(&self, command_type: &str) {
        (**self).command_unmatched(command_type);
    }

    fn command_failed(&self, command_type: &str, error: &DispatchError) {
        (**self).command_failed(command_type, error);
    }

    fn teardown_started(&self) {
        (**self).teardown_started();
    }

    fn teardown_skipped(&self) {
        (**self).teardown_skipped();
    }

    fn teardown_completed(&self) {
        (**self).teardown_completed();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn controller_inert(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "controller_inert",
            "no orchestration session configured; agent stays inert"
        );
    }

    fn startup_step(&self, step: StartupStep) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "startup_step",
            step = %step,
            "running startup step"
        );
    }

    fn startup_failed(&self, error: &StartupError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "startup_failed",
            error = %error,
            "agent startup failed"
        );
    }

    fn ready(&self, commands: &[String]) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "ready",
            commands = ?commands,
            "agent ready"
        );
    }

    fn command_unmatched(&self, command_type: &str) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "command_unmatched",
            command = command_type,
            "no handler for command"
        );
    }

    fn command_failed(&self, command_type: &str, error: &DispatchError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "command_failed",
            command = command_type,
            error = %error,
            "command failed"
        );
    }

    fn teardown_started(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "teardown_started",
            "stopping agent"
        );
    }

    fn teardown_skipped(&self) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "teardown_skipped",
            "teardown already ran"
        );
    }

    fn teardown_completed(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "teardown_completed",
            "agent stopped"
        );
    }
}
