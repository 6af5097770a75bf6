//! Inbound commands and the reserved command-type identifiers.

use std::fmt;

/// Correlation id attached to the readiness command the agent dispatches to
/// itself when the transport connects.
pub const READINESS_CORRELATION_ID: i64 = -1000;

/// A single inbound command, alive only for the duration of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: String,
    payload: String,
    correlation_id: i64,
}

impl Command {
    /// Builds a command from its wire parts.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: impl Into<String>, correlation_id: i64) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
            correlation_id,
        }
    }

    /// The readiness probe dispatched after the transport connects.
    #[must_use]
    pub fn readiness() -> Self {
        Self::new(
            CommandType::IsReady.as_str(),
            String::new(),
            READINESS_CORRELATION_ID,
        )
    }

    /// Command type used for registry lookup.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    /// Opaque payload handed to the handler.
    #[must_use]
    pub fn payload(&self) -> &str {
        self.payload.as_str()
    }

    /// Identifier echoed back in replies.
    #[must_use]
    pub fn correlation_id(&self) -> i64 {
        self.correlation_id
    }
}

/// Command types the agent registers handlers for.
///
/// The wire names are fixed; orchestration servers address handlers by these
/// exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Readiness probe.
    IsReady,
    /// Reload the host application.
    AppReload,
    /// Query the host's idle/busy status.
    CurrentStatus,
    /// Invoke a method inside the host.
    Invoke,
    /// Finish the session and stop the agent.
    Cleanup,
    /// Start or stop performance recording.
    SetRecordingState,
    /// Record an instrumentation event.
    Event,
}

impl CommandType {
    /// Types registered on every startup.
    pub const ALWAYS: [Self; 5] = [
        Self::IsReady,
        Self::AppReload,
        Self::CurrentStatus,
        Self::Invoke,
        Self::Cleanup,
    ];

    /// Types registered only when instrumentation is supported.
    pub const INSTRUMENTATION: [Self; 2] = [Self::SetRecordingState, Self::Event];

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsReady => "isReady",
            Self::AppReload => "reactNativeReload",
            Self::CurrentStatus => "currentStatus",
            Self::Invoke => "invoke",
            Self::Cleanup => "cleanup",
            Self::SetRecordingState => "setRecordingState",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("isReady", CommandType::IsReady)]
    #[case("reactNativeReload", CommandType::AppReload)]
    #[case("currentStatus", CommandType::CurrentStatus)]
    #[case("invoke", CommandType::Invoke)]
    #[case("cleanup", CommandType::Cleanup)]
    #[case("setRecordingState", CommandType::SetRecordingState)]
    #[case("event", CommandType::Event)]
    fn wire_names_match_reserved_commands(#[case] name: &str, #[case] kind: CommandType) {
        assert_eq!(kind.as_str(), name);
        assert_eq!(kind.to_string(), name);
    }

    #[test]
    fn readiness_command_uses_reserved_correlation_id() {
        let command = Command::readiness();
        assert_eq!(command.kind(), "isReady");
        assert_eq!(command.payload(), "");
        assert_eq!(command.correlation_id(), READINESS_CORRELATION_ID);
    }
}
