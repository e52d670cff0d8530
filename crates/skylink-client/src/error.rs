//! Error types for the telemetry client.

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Abrupt termination of the streaming connection.
///
/// Always absorbed by the connection manager: it becomes a connectivity
/// change plus a scheduled reconnect, never an error seen by consumers.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed by remote")]
    Closed,
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("connect attempt timed out after {0:?}")]
    ConnectTimeout(Duration),
    /// The outbound half stopped accepting writes.
    #[error("send stalled for {0:?}")]
    SendTimeout(Duration),
}

/// Errors surfaced to callers of the client API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A send was attempted while the link is down. The command is dropped.
    #[error("not connected to the simulation core")]
    NotConnected,
    /// Launch refused because the simulation core is unreachable.
    #[error("simulation core offline, cannot launch")]
    CoreOffline,
    #[error("mission already launched")]
    AlreadyLaunched,
    #[error("invalid launch coordinates ({lat}, {lon})")]
    InvalidCoordinates { lat: f64, lon: f64 },
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    /// The connection manager task is no longer running.
    #[error("telemetry client has shut down")]
    ClientStopped,
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
