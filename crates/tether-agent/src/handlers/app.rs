//! Handlers backed by the application facade.

use std::sync::Arc;

use serde_json::json;

use crate::dispatch::{CommandHandler, HandlerError};
use crate::host::AppFacade;
use crate::transport::{OutboundMessage, Transport, kinds};

/// `isReady`: replies `ready` once the application is idle.
pub struct ReadyHandler {
    app: Arc<dyn AppFacade>,
    transport: Arc<dyn Transport>,
}

impl ReadyHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(app: Arc<dyn AppFacade>, transport: Arc<dyn Transport>) -> Self {
        Self { app, transport }
    }
}

impl CommandHandler for ReadyHandler {
    fn handle(&self, _payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        self.app.await_idle()?;
        self.transport
            .send(&OutboundMessage::empty(kinds::READY, correlation_id))?;
        Ok(())
    }
}

/// `reactNativeReload`: reloads, waits for idle, replies `ready`.
pub struct ReloadHandler {
    app: Arc<dyn AppFacade>,
    transport: Arc<dyn Transport>,
}

impl ReloadHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(app: Arc<dyn AppFacade>, transport: Arc<dyn Transport>) -> Self {
        Self { app, transport }
    }
}

impl CommandHandler for ReloadHandler {
    fn handle(&self, _payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        self.app.reload()?;
        self.app.await_idle()?;
        self.transport
            .send(&OutboundMessage::empty(kinds::READY, correlation_id))?;
        Ok(())
    }
}

/// `currentStatus`: replies with the application's activity snapshot.
pub struct StatusHandler {
    app: Arc<dyn AppFacade>,
    transport: Arc<dyn Transport>,
}

impl StatusHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(app: Arc<dyn AppFacade>, transport: Arc<dyn Transport>) -> Self {
        Self { app, transport }
    }
}

impl CommandHandler for StatusHandler {
    fn handle(&self, _payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        let status = self.app.status()?;
        let params = json!({ "status": serde_json::to_value(status)? });
        self.transport.send(&OutboundMessage::new(
            kinds::CURRENT_STATUS_RESULT,
            params,
            correlation_id,
        ))?;
        Ok(())
    }
}
