//! Built-in command handlers.
//!
//! Each handler is a thin adapter: it calls the host collaborator for its
//! command type and replies over the transport with the correlation id it
//! received.

mod app;
mod cleanup;
mod instruments;
mod invoke;

use std::sync::Arc;

use crate::dispatch::{CommandType, HandlerRegistry};
use crate::host::HostServices;
use crate::transport::Transport;

pub use self::app::{ReadyHandler, ReloadHandler, StatusHandler};
pub use self::cleanup::{CleanupHandler, StopRequester};
pub use self::instruments::{EventHandler, RecordingStateHandler};
pub use self::invoke::InvokeHandler;

/// Everything a handler may need.
#[derive(Clone)]
pub struct HandlerContext {
    /// Reply channel.
    pub transport: Arc<dyn Transport>,
    /// Host collaborators.
    pub host: HostServices,
    /// Requests agent shutdown.
    pub stop: Arc<dyn StopRequester>,
}

/// Builds a fresh registry for one startup.
///
/// The five always-on types are registered unconditionally; the
/// instrumentation types only when the host's instrumentation reports itself
/// supported.
#[must_use]
pub fn build_registry(context: &HandlerContext) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    let transport = &context.transport;
    let app = &context.host.app;

    registry.register(
        CommandType::IsReady,
        Arc::new(ReadyHandler::new(Arc::clone(app), Arc::clone(transport))),
    );
    registry.register(
        CommandType::AppReload,
        Arc::new(ReloadHandler::new(Arc::clone(app), Arc::clone(transport))),
    );
    registry.register(
        CommandType::CurrentStatus,
        Arc::new(StatusHandler::new(Arc::clone(app), Arc::clone(transport))),
    );
    registry.register(
        CommandType::Invoke,
        Arc::new(InvokeHandler::new(
            Arc::clone(&context.host.invoker),
            Arc::clone(transport),
        )),
    );
    registry.register(
        CommandType::Cleanup,
        Arc::new(CleanupHandler::new(
            Arc::clone(transport),
            Arc::clone(&context.stop),
        )),
    );

    if let Some(instruments) = context.host.supported_instruments() {
        registry.register(
            CommandType::SetRecordingState,
            Arc::new(RecordingStateHandler::new(
                Arc::clone(&instruments),
                Arc::clone(transport),
            )),
        );
        registry.register(
            CommandType::Event,
            Arc::new(EventHandler::new(instruments, Arc::clone(transport))),
        );
    }
    registry
}
