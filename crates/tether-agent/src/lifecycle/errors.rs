//! Errors raised by the lifecycle controller.

use thiserror::Error;

use crate::host::HostError;
use crate::pool::PoolError;
use crate::transport::TransportError;

use super::LifecycleState;

/// Errors raised while waiting on the initialisation barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BarrierError {
    /// Teardown abandoned the barrier before startup released it.
    #[error("initialisation barrier was abandoned before release")]
    Abandoned,
    /// The barrier's lock was poisoned by a panicking thread.
    #[error("initialisation barrier lock was poisoned")]
    Poisoned,
}

/// An edge the lifecycle state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal lifecycle transition from {from} to {to}")]
pub struct TransitionError {
    /// State before the attempted move.
    pub from: LifecycleState,
    /// Requested state.
    pub to: LifecycleState,
}

/// Errors returned by [`crate::LifecycleController::start`].
#[derive(Debug, Error)]
pub enum ControllerError {
    /// `start` was already called on this controller.
    #[error("controller already started")]
    AlreadyStarted,
    /// The worker pool could not be created or refused the startup item.
    #[error("worker pool failure: {0}")]
    Pool(#[from] PoolError),
}

/// Failures inside the startup work item.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The transport failed to connect.
    #[error("transport connect failed: {0}")]
    Connect(#[source] TransportError),
    /// The host never finished bootstrapping.
    #[error("host bootstrap failed: {0}")]
    Bootstrap(#[source] HostError),
    /// Teardown began before startup could release the barrier.
    #[error("startup superseded by teardown in state {state}")]
    Superseded {
        /// State observed at the end of startup.
        state: LifecycleState,
    },
}
