//! Defines the error surface of the agent launcher.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use tether_config::ServerUrlParseError;

use crate::lifecycle::ControllerError;
use crate::telemetry::TelemetryError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the agent.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The configured server address is malformed.
    #[error("invalid orchestration server address: {source}")]
    Identity {
        /// Underlying parse error.
        #[source]
        source: ServerUrlParseError,
    },
    /// The controller failed to start.
    #[error("failed to start agent: {source}")]
    Controller {
        /// Underlying controller error.
        #[source]
        source: ControllerError,
    },
    /// The shutdown listener failed.
    #[error("failed to listen for shutdown signals: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<Arc<OrthoError>> for LaunchError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Config { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<ServerUrlParseError> for LaunchError {
    fn from(source: ServerUrlParseError) -> Self {
        Self::Identity { source }
    }
}

impl From<ControllerError> for LaunchError {
    fn from(source: ControllerError) -> Self {
        Self::Controller { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
