use url::Url;

use crate::error::Result;

/// Port the reference chat server binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1:4884";

const CONNECT_PATH: &str = "/connect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host[:port]` of the chat server.
    pub host: String,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            secure: false,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, secure: bool) -> Self {
        Self {
            host: host.into(),
            secure,
        }
    }

    /// Websocket endpoint derived from the host, e.g. `ws://127.0.0.1:4884/connect`.
    pub fn endpoint(&self) -> Result<Url> {
        let scheme = if self.secure { "wss" } else { "ws" };
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(url::ParseError::EmptyHost.into());
        }
        Ok(Url::parse(&format!("{scheme}://{host}{CONNECT_PATH}"))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn default_endpoint() {
        let url = ClientConfig::default().endpoint().unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:4884/connect");
    }

    #[test]
    fn secure_endpoint() {
        let url = ClientConfig::new("plume.chat", true).endpoint().unwrap();
        assert_eq!(url.as_str(), "wss://plume.chat/connect");
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let url = ClientConfig::new("localhost:8080/", false).endpoint().unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8080/connect");
    }

    #[test]
    fn rejects_bad_host() {
        let err = ClientConfig::new("", false).endpoint().unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(url::ParseError::EmptyHost)));

        let err = ClientConfig::new("bad host", false).endpoint().unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(_)));
    }
}
