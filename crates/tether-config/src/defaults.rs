use std::time::Duration;

use crate::logging::LogFormat;

/// Default log filter expression used by the agent.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default time the host heartbeat may stall before the agent reports the
/// application as unresponsive.
pub const DEFAULT_HANG_THRESHOLD_MS: u64 = 5_000;

/// Upper bound used when waiting for the agent's work queue to drain.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Default log filter expression used by the agent.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the agent.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default hang threshold in milliseconds.
pub fn default_hang_threshold_ms() -> u64 {
    DEFAULT_HANG_THRESHOLD_MS
}
