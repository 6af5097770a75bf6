use std::io;
use std::thread::{self, JoinHandle};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{info, warn};

use super::PROCESS_TARGET;

/// Callback run when a shutdown signal arrives.
pub type ShutdownCallback = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Runs `on_signal` from a background thread when shutdown is requested.
    ///
    /// Listening ends when the returned guard is closed or dropped.
    fn listen(&self, on_signal: ShutdownCallback) -> Result<ShutdownGuard, ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The listener thread could not be started.
    #[error("failed to spawn signal listener: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Stops a running listener.
pub struct ShutdownGuard {
    close: Option<Box<dyn FnOnce() + Send>>,
    listener: Option<JoinHandle<()>>,
}

impl ShutdownGuard {
    /// Guard for a listener that needs no cleanup.
    #[must_use]
    pub fn inert() -> Self {
        Self {
            close: None,
            listener: None,
        }
    }

    fn new(close: impl FnOnce() + Send + 'static, listener: JoinHandle<()>) -> Self {
        Self {
            close: Some(Box::new(close)),
            listener: Some(listener),
        }
    }

    /// Stops listening and waits for the listener thread.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(close) = self.close.take() {
            close();
        }
        if let Some(listener) = self.listener.take() {
            if listener.join().is_err() {
                warn!(target: PROCESS_TARGET, "signal listener panicked");
            }
        }
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Listener for SIGTERM, SIGINT, SIGQUIT and SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn listen(&self, on_signal: ShutdownCallback) -> Result<ShutdownGuard, ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        let listener = thread::Builder::new()
            .name("tether-signals".to_owned())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    info!(
                        target: PROCESS_TARGET,
                        signal,
                        "shutdown signal received"
                    );
                    on_signal();
                }
            })
            .map_err(|source| ShutdownError::Spawn { source })?;
        Ok(ShutdownGuard::new(move || handle.close(), listener))
    }
}
