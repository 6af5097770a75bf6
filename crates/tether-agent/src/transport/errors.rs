//! Error types for transport operations.

use std::io;

use thiserror::Error;

/// Errors surfaced while connecting, sending, or closing the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The bundled transport speaks plain WebSocket only.
    #[error("unsupported transport scheme '{scheme}' for {url}")]
    UnsupportedScheme {
        /// Scheme that was rejected.
        scheme: String,
        /// Full server address.
        url: String,
    },
    /// Opening the TCP connection failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// `host:port` the transport dialled.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The WebSocket upgrade was refused or malformed.
    #[error("websocket handshake with {url} failed: {message}")]
    Handshake {
        /// Server address.
        url: String,
        /// Description of the failure.
        message: String,
    },
    /// Adjusting socket options failed.
    #[error("failed to configure socket: {source}")]
    Configure {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Writing a frame failed.
    #[error("failed to send message: {source}")]
    Send {
        /// Underlying WebSocket error.
        #[source]
        source: Box<tungstenite::Error>,
    },
    /// Encoding an outbound envelope failed.
    #[error("failed to serialise message: {0}")]
    Serialise(#[from] serde_json::Error),
    /// The transport is not connected or was already closed.
    #[error("transport is closed")]
    Closed,
    /// The background reader could not be started.
    #[error("failed to spawn transport reader thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
