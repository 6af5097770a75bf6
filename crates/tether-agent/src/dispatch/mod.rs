//! Command routing from the transport to registered handlers.

mod command;
mod errors;
mod registry;
mod router;

pub use self::command::{Command, CommandType, READINESS_CORRELATION_ID};
pub use self::errors::{DispatchError, HandlerError};
pub use self::registry::{HandlerRegistry, SharedRegistry};
pub use self::router::{CommandRouter, Routed};

/// Executes one command type.
///
/// Handlers run on worker threads and may run concurrently with each other.
pub trait CommandHandler: Send + Sync {
    /// Handles `payload`, replying with `correlation_id` where applicable.
    fn handle(&self, payload: &str, correlation_id: i64) -> Result<(), HandlerError>;
}
