use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Address of the test-orchestration server the agent connects to.
///
/// Only WebSocket schemes are accepted. The port falls back to the scheme's
/// well-known port when the address omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerUrl {
    url: Url,
}

impl ServerUrl {
    /// Returns the URL scheme (`ws` or `wss`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Returns true when the address requests a TLS connection.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }

    /// Returns the host component.
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Returns the explicit port or the scheme's default port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.url
            .port_or_known_default()
            .unwrap_or(if self.is_secure() { 443 } else { 80 })
    }

    /// Returns the full address as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.url.as_str())
    }
}

impl FromStr for ServerUrl {
    type Err = ServerUrlParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input.trim())?;
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(ServerUrlParseError::UnsupportedScheme(other.to_owned())),
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ServerUrlParseError::MissingHost(input.to_owned()));
        }
        Ok(Self { url })
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = ServerUrlParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerUrl> for String {
    fn from(value: ServerUrl) -> Self {
        value.url.into()
    }
}

/// Errors encountered while parsing a [`ServerUrl`] from text.
#[derive(Debug, Error)]
pub enum ServerUrlParseError {
    /// Scheme was not a WebSocket scheme.
    #[error("unsupported server scheme '{0}', expected ws or wss")]
    UnsupportedScheme(String),
    /// Host name was missing.
    #[error("missing host in '{0}'")]
    MissingHost(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
