//! `cleanup` handler.

use std::sync::Arc;

use crate::dispatch::{CommandHandler, HandlerError};
use crate::transport::{OutboundMessage, Transport, kinds};

/// Requests that the agent shut down.
pub trait StopRequester: Send + Sync {
    /// Schedules teardown. Must not block on it.
    fn request_stop(&self);
}

/// Replies `cleanupDone`, then stops the agent.
pub struct CleanupHandler {
    transport: Arc<dyn Transport>,
    stop: Arc<dyn StopRequester>,
}

impl CleanupHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, stop: Arc<dyn StopRequester>) -> Self {
        Self { transport, stop }
    }
}

impl CommandHandler for CleanupHandler {
    fn handle(&self, _payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        let sent = self
            .transport
            .send(&OutboundMessage::empty(kinds::CLEANUP_DONE, correlation_id));
        self.stop.request_stop();
        sent.map_err(HandlerError::from)
    }
}
