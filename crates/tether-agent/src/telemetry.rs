//! Process-wide tracing setup.
//!
//! Events go to stderr through one `fmt` layer chosen by the configured
//! [`LogFormat`], behind an [`EnvFilter`] built from the configured filter.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt::{self, time::UtcTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use tether_config::{Config, LogFormat};

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

/// Format of the subscriber this process installed.
static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter expression is not a valid directive list.
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        /// Rejected expression.
        filter: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// A global subscriber was installed outside the agent.
    #[error("a global tracing subscriber is already installed: {0}")]
    Install(#[from] TryInitError),
}

/// Installs the subscriber for `config` and returns the format in effect.
///
/// Only the first successful call installs anything; later calls keep the
/// subscriber already in place.
pub fn initialise(config: &Config) -> Result<LogFormat, TelemetryError> {
    let format = *INSTALLED.get_or_try_init(|| install(config).map(|()| config.log_format()))?;
    if format != config.log_format() {
        debug!(
            target: TELEMETRY_TARGET,
            installed = %format,
            requested = %config.log_format(),
            "keeping the installed log format"
        );
    }
    Ok(format)
}

fn filter(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::builder()
        .parse(config.log_filter())
        .map_err(|source| TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            source,
        })
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let format = config.log_format();
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_thread_names(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });
    let compact = (format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_thread_names(true)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(UtcTime::rfc_3339())
            .with_writer(io::stderr)
    });
    tracing_subscriber::registry()
        .with(filter(config)?)
        .with(json)
        .with(compact)
        .try_init()?;
    Ok(())
}
