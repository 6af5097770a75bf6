//! JSON envelope exchanged with the orchestration server.
//!
//! Every frame is a text message of the form
//! `{"type": "...", "params": {...}, "messageId": 7}`. Inbound `params` are
//! kept as opaque JSON text; only handlers interpret them.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::dispatch::Command;

/// Reply and notification types the agent sends.
pub mod kinds {
    /// Session handshake sent right after the socket opens.
    pub const LOGIN: &str = "login";
    /// Reply to `isReady` and `reactNativeReload`.
    pub const READY: &str = "ready";
    /// Reply to `currentStatus`.
    pub const CURRENT_STATUS_RESULT: &str = "currentStatusResult";
    /// Successful reply to `invoke`.
    pub const INVOKE_RESULT: &str = "invokeResult";
    /// Failed `invoke`.
    pub const TEST_FAILED: &str = "testFailed";
    /// Reply to `cleanup`.
    pub const CLEANUP_DONE: &str = "cleanupDone";
    /// Reply to `setRecordingState`.
    pub const SET_RECORDING_STATE_DONE: &str = "setRecordingStateDone";
    /// Reply to `event`.
    pub const EVENT_DONE: &str = "eventDone";
    /// Sent by the crash handler before the process goes down.
    pub const APP_WILL_TERMINATE_WITH_ERROR: &str = "AppWillTerminateWithError";
    /// Sent by the hang detector when the host stops responding.
    pub const APP_NONRESPONSIVE_DETECTED: &str = "AppNonresponsiveDetected";
}

/// Correlation id used for the login handshake.
pub const LOGIN_CORRELATION_ID: i64 = 0;

/// A message sent from the agent to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    kind: String,
    params: Value,
    #[serde(rename = "messageId")]
    correlation_id: i64,
}

impl OutboundMessage {
    /// Builds a message with arbitrary parameters.
    #[must_use]
    pub fn new(kind: impl Into<String>, params: Value, correlation_id: i64) -> Self {
        Self {
            kind: kind.into(),
            params,
            correlation_id,
        }
    }

    /// Builds a reply with an empty parameter object.
    #[must_use]
    pub fn empty(kind: impl Into<String>, correlation_id: i64) -> Self {
        Self::new(kind, json!({}), correlation_id)
    }

    /// Builds the session handshake.
    #[must_use]
    pub fn login(session_id: &str) -> Self {
        Self::new(
            kinds::LOGIN,
            json!({ "sessionId": session_id, "role": "app" }),
            LOGIN_CORRELATION_ID,
        )
    }

    /// Message type.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_str()
    }

    /// Message parameters.
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Correlation id.
    #[must_use]
    pub fn correlation_id(&self) -> i64 {
        self.correlation_id
    }

    /// Serialises the envelope to JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    params: Value,
    #[serde(rename = "messageId", default)]
    correlation_id: i64,
}

/// Parses an inbound text frame into a [`Command`].
pub fn parse_command(text: &str) -> Result<Command, serde_json::Error> {
    let envelope: InboundEnvelope = serde_json::from_str(text)?;
    let payload = match envelope.params {
        Value::Null => String::new(),
        params => params.to_string(),
    };
    Ok(Command::new(envelope.kind, payload, envelope.correlation_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_envelope() {
        let command = parse_command(
            r#"{"type":"invoke","params":{"target":"app"},"messageId":12}"#,
        )
        .expect("command");
        assert_eq!(command.kind(), "invoke");
        assert_eq!(command.correlation_id(), 12);
        let payload: Value = serde_json::from_str(command.payload()).expect("payload json");
        assert_eq!(payload, json!({ "target": "app" }));
    }

    #[test]
    fn missing_params_become_empty_payload() {
        let command = parse_command(r#"{"type":"isReady","messageId":3}"#).expect("command");
        assert_eq!(command.payload(), "");
    }

    #[test]
    fn rejects_envelope_without_type() {
        assert!(parse_command(r#"{"params":{},"messageId":1}"#).is_err());
    }

    #[test]
    fn login_serialises_session_and_role() {
        let text = OutboundMessage::login("s1").to_json().expect("json");
        let value: Value = serde_json::from_str(&text).expect("value");
        assert_eq!(
            value,
            json!({
                "type": "login",
                "params": { "sessionId": "s1", "role": "app" },
                "messageId": 0
            })
        );
    }
}
