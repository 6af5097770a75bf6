//! `invoke` handler.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::dispatch::{CommandHandler, HandlerError};
use crate::host::MethodInvoker;
use crate::transport::{OutboundMessage, Transport, kinds};

const HANDLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handlers");

/// Runs the invocation and replies `invokeResult`, or `testFailed` when the
/// host rejects it. A host failure is a remote test failure, not a handler
/// error.
pub struct InvokeHandler {
    invoker: Arc<dyn MethodInvoker>,
    transport: Arc<dyn Transport>,
}

impl InvokeHandler {
    /// Builds the handler.
    #[must_use]
    pub fn new(invoker: Arc<dyn MethodInvoker>, transport: Arc<dyn Transport>) -> Self {
        Self { invoker, transport }
    }
}

impl CommandHandler for InvokeHandler {
    fn handle(&self, payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
        let reply = match self.invoker.invoke(payload) {
            Ok(result) => OutboundMessage::new(
                kinds::INVOKE_RESULT,
                json!({ "result": result }),
                correlation_id,
            ),
            Err(error) => {
                info!(
                    target: HANDLER_TARGET,
                    correlation_id,
                    error = %error,
                    "invocation failed"
                );
                OutboundMessage::new(
                    kinds::TEST_FAILED,
                    json!({ "details": error.to_string() }),
                    correlation_id,
                )
            }
        };
        self.transport.send(&reply)?;
        Ok(())
    }
}
