//! Instrumentation handlers, registered only when instrumentation is
//! supported.

use std::sync::Arc;

use crate::dispatch::{CommandHandler, HandlerError};
use crate::host::{Instruments, RecordingState};
use crate::transport::{OutboundMessage, Transport, kinds};

/// `setRecordingState`.
pub struct RecordingStateHandler {
    instruments: Arc<dyn Instruments>,
    transport: Arc<dyn Transport>,
}

impl RecordingStateHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(instruments: Arc<dyn Instruments>, transport: Arc<dyn Transport>) -> Self {
        Self {
            instruments,
            transport,
        }
    }
}

impl CommandHandler for RecordingStateHandler {
    fn handle(&self, payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        let state = RecordingState::from_payload(payload)?;
        self.instruments.set_recording_state(&state)?;
        self.transport.send(&OutboundMessage::empty(
            kinds::SET_RECORDING_STATE_DONE,
            correlation_id,
        ))?;
        Ok(())
    }
}

/// `event`.
pub struct EventHandler {
    instruments: Arc<dyn Instruments>,
    transport: Arc<dyn Transport>,
}

impl EventHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(instruments: Arc<dyn Instruments>, transport: Arc<dyn Transport>) -> Self {
        Self {
            instruments,
            transport,
        }
    }
}

impl CommandHandler for EventHandler {
    fn handle(&self, payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        self.instruments.record_event(payload)?;
        self.transport
            .send(&OutboundMessage::empty(kinds::EVENT_DONE, correlation_id))?;
        Ok(())
    }
}
