//! Errors raised while dispatching commands to handlers.

use thiserror::Error;

use crate::host::HostError;
use crate::lifecycle::BarrierError;
use crate::transport::TransportError;

/// Failure reported by a [`super::CommandHandler`].
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Sending the reply failed.
    #[error("reply failed: {0}")]
    Transport(#[from] TransportError),
    /// The host collaborator reported a failure.
    #[error("host call failed: {0}")]
    Host(#[from] HostError),
    /// The payload could not be decoded.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Failure of a single command work item.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The barrier wait failed; the command was not executed.
    #[error("command abandoned before dispatch: {0}")]
    Barrier(#[from] BarrierError),
    /// The handler ran and returned an error.
    #[error("handler for '{command_type}' failed: {source}")]
    Handler {
        /// Command type that was dispatched.
        command_type: String,
        /// Handler error.
        #[source]
        source: HandlerError,
    },
}
