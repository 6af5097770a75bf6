//! Orchestration session identity.

use tether_config::{Config, ServerUrl, ServerUrlParseError};

/// Server address and session id the agent joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    server: ServerUrl,
    session_id: String,
}

impl SessionIdentity {
    /// Builds an identity from its parts.
    #[must_use]
    pub fn new(server: ServerUrl, session_id: impl Into<String>) -> Self {
        Self {
            server,
            session_id: session_id.into(),
        }
    }

    /// Resolves the identity from configuration.
    ///
    /// Returns `Ok(None)` when either value is missing or blank. A present
    /// but malformed server address is an error.
    pub fn from_config(config: &Config) -> Result<Option<Self>, ServerUrlParseError> {
        let (Some(server), Some(session_id)) = (config.server_url(), config.session_id()) else {
            return Ok(None);
        };
        Ok(Some(Self::new(server.parse()?, session_id)))
    }

    /// Orchestration server address.
    #[must_use]
    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    /// Session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config(server_url: Option<&str>, session_id: Option<&str>) -> Config {
        Config {
            server_url: server_url.map(str::to_owned),
            session_id: session_id.map(str::to_owned),
            ..Config::default()
        }
    }

    #[rstest]
    #[case(None, Some("s1"))]
    #[case(Some("ws://h:1"), None)]
    #[case(Some(""), Some("s1"))]
    #[case(Some("ws://h:1"), Some("  "))]
    fn incomplete_sessions_are_inert(
        #[case] server_url: Option<&str>,
        #[case] session_id: Option<&str>,
    ) {
        let identity = SessionIdentity::from_config(&config(server_url, session_id))
            .expect("absent values are not errors");
        assert!(identity.is_none());
    }

    #[test]
    fn resolves_complete_session() {
        let identity = SessionIdentity::from_config(&config(Some("ws://h:1"), Some("s1")))
            .expect("valid")
            .expect("present");
        assert_eq!(identity.server().host(), "h");
        assert_eq!(identity.server().port(), 1);
        assert_eq!(identity.session_id(), "s1");
    }

    #[test]
    fn malformed_server_is_an_error() {
        assert!(SessionIdentity::from_config(&config(Some("http://h:1"), Some("s1"))).is_err());
    }
}
