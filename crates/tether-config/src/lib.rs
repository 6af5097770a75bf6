//! Shared configuration for the tether agent.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then
//! configuration files, then `TETHER_*` environment variables, then command
//! line flags. The agent reads its orchestration session from here: when
//! either the server address or the session id is missing the agent stays
//! inert rather than failing.

mod defaults;
mod logging;
mod server;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_HANG_THRESHOLD_MS, DEFAULT_JOIN_TIMEOUT, DEFAULT_LOG_FILTER,
    default_hang_threshold_ms, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use server::{ServerUrl, ServerUrlParseError};

/// Resolved agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TETHER")]
pub struct Config {
    /// Address of the orchestration server, for example `ws://localhost:8099`.
    #[serde(default)]
    pub server_url: Option<String>,
    /// Session the agent joins on the orchestration server.
    #[serde(default)]
    pub session_id: Option<String>,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Heartbeat stall, in milliseconds, reported as an unresponsive host.
    #[serde(default = "default_hang_threshold_ms")]
    #[ortho_config(default = default_hang_threshold_ms())]
    pub hang_threshold_ms: u64,
}

impl Config {
    /// Server address, when one was configured and is not blank.
    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        non_blank(self.server_url.as_deref())
    }

    /// Session id, when one was configured and is not blank.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        non_blank(self.session_id.as_deref())
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Heartbeat stall reported as an unresponsive host.
    #[must_use]
    pub fn hang_threshold(&self) -> Duration {
        Duration::from_millis(self.hang_threshold_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            session_id: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            hang_threshold_ms: default_hang_threshold_ms(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_session() {
        let config = Config::default();
        assert!(config.server_url().is_none());
        assert!(config.session_id().is_none());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.hang_threshold(), Duration::from_secs(5));
    }

    #[test]
    fn blank_values_count_as_absent() {
        let config = Config {
            server_url: Some("  ".to_owned()),
            session_id: Some(String::new()),
            ..Config::default()
        };
        assert!(config.server_url().is_none());
        assert!(config.session_id().is_none());
    }
}
