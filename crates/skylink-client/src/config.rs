//! Client configuration from environment.

use std::env;
use std::time::Duration;

use tokio_tungstenite::tungstenite::http::Uri;

use crate::error::ClientError;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/simulation";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Streaming endpoint of the simulation core
    pub endpoint: String,
    /// Fixed delay between a disconnect and the next connect attempt
    pub reconnect_delay: Duration,
    /// Upper bound on a single connect attempt
    pub connect_timeout: Duration,
    /// Upper bound on writing or closing the outbound half; a stall past it
    /// counts as a lost link
    pub send_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("SKYLINK_WS_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            reconnect_delay: env_millis("SKYLINK_RECONNECT_DELAY_MS")
                .unwrap_or(DEFAULT_RECONNECT_DELAY),
            connect_timeout: env_millis("SKYLINK_CONNECT_TIMEOUT_MS")
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            send_timeout: env_millis("SKYLINK_SEND_TIMEOUT_MS").unwrap_or(DEFAULT_SEND_TIMEOUT),
        }
    }

    /// Check the endpoint and map `http(s)` base URLs onto `ws(s)`.
    pub fn validate(mut self) -> Result<Self, ClientError> {
        self.endpoint = normalize_endpoint(&self.endpoint)?;
        Ok(self)
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
}

fn normalize_endpoint(endpoint: &str) -> Result<String, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = endpoint.trim();
    let rewritten = if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else {
        trimmed.to_string()
    };

    let uri: Uri = rewritten.parse().map_err(|_| invalid("not a valid URI"))?;
    match uri.scheme_str() {
        Some("ws") | Some("wss") => {}
        _ => return Err(invalid("scheme must be ws, wss, http or https")),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_simulation_core() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "ws://localhost:8000/ws/simulation");
        assert_eq!(config.reconnect_delay, Duration::from_millis(2000));
        assert_eq!(config.send_timeout, Duration::from_secs(5));
    }

    #[test]
    fn http_endpoints_are_mapped_to_websocket() {
        let config = ClientConfig {
            endpoint: "https://core.example.com/ws/simulation".to_string(),
            ..ClientConfig::default()
        }
        .validate()
        .unwrap();
        assert_eq!(config.endpoint, "wss://core.example.com/ws/simulation");
    }

    #[test]
    fn rejects_foreign_scheme() {
        let result = ClientConfig {
            endpoint: "ftp://localhost/ws".to_string(),
            ..ClientConfig::default()
        }
        .validate();
        assert!(matches!(result, Err(ClientError::InvalidEndpoint { .. })));
    }

    #[test]
    fn rejects_garbage() {
        let result = ClientConfig {
            endpoint: "not a url".to_string(),
            ..ClientConfig::default()
        }
        .validate();
        assert!(matches!(result, Err(ClientError::InvalidEndpoint { .. })));
    }
}
