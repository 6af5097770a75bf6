//! Lifecycle state machine.

use std::fmt;

use super::errors::TransitionError;

/// Phase of the agent's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Constructed; `start` not yet called.
    #[default]
    Unstarted,
    /// Startup work item queued or running.
    Starting,
    /// Barrier released; commands dispatch.
    Ready,
    /// Teardown in progress.
    Stopping,
    /// Teardown finished. Terminal.
    Stopped,
}

impl LifecycleState {
    /// Validates and performs a move to `next`.
    pub fn transition(self, next: Self) -> Result<Self, TransitionError> {
        use LifecycleState::{Ready, Starting, Stopped, Stopping, Unstarted};
        match (self, next) {
            (Unstarted, Starting)
            | (Starting, Ready)
            | (Starting | Ready | Stopping, Stopping)
            | (Stopping, Stopped) => Ok(next),
            (from, to) => Err(TransitionError { from, to }),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
