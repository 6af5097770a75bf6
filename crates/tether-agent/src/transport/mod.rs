//! Transport link to the orchestration server.
//!
//! The controller talks to the server through [`Transport`] and learns about
//! connection events through [`TransportEvents`]. The bundled implementation
//! is a plain WebSocket client; tests substitute recording doubles through
//! [`TransportFactory`].

mod errors;
mod message;
mod websocket;

use std::sync::Arc;

use tether_config::ServerUrl;

use crate::dispatch::Command;

pub use self::errors::TransportError;
pub use self::message::{LOGIN_CORRELATION_ID, OutboundMessage, kinds, parse_command};
pub use self::websocket::{WebSocketTransport, WebSocketTransportFactory};

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Bidirectional message channel to the orchestration server.
pub trait Transport: Send + Sync {
    /// Connects to `server` and joins `session_id`.
    ///
    /// Implementations report a successful connection through
    /// [`TransportEvents::on_connected`] and may do so before returning.
    fn connect(&self, server: &ServerUrl, session_id: &str) -> Result<(), TransportError>;

    /// Sends a message to the server.
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Closes the connection. Closing an already closed transport is a no-op.
    fn close(&self);
}

/// Connection callbacks raised by a [`Transport`].
pub trait TransportEvents: Send + Sync {
    /// The connection is established and the session joined.
    fn on_connected(&self);

    /// A command arrived from the server.
    fn on_command(&self, command: Command);

    /// The connection closed, locally or remotely.
    fn on_closed(&self);
}

/// Builds transports bound to an event sink.
pub trait TransportFactory: Send + Sync {
    /// Creates an unconnected transport that reports to `events`.
    fn create(&self, events: Arc<dyn TransportEvents>) -> Arc<dyn Transport>;
}
