//! Operator command channel.
//!
//! The only outbound operator action is `launch`. It is admitted only from
//! the lobby while the link is up, goes out exactly once, and flips the
//! mission to active. Rejected launches are never queued.

use skylink_core::{Command, MissionPhase, Position};

use crate::connection::ConnectionHandle;
use crate::error::ClientError;
use crate::store::StoreState;

#[derive(Debug, Clone)]
pub struct CommandChannel {
    connection: ConnectionHandle,
}

impl CommandChannel {
    pub fn new(connection: ConnectionHandle) -> Self {
        Self { connection }
    }

    /// Launch the mission around `(lat, lon)`.
    ///
    /// Fails with `CoreOffline` when the link is down and `AlreadyLaunched`
    /// once the mission is active; neither touches the mission phase.
    pub async fn launch(&self, lat: f64, lon: f64) -> Result<(), ClientError> {
        if Position::new(lat, lon).is_err() {
            return Err(ClientError::InvalidCoordinates { lat, lon });
        }
        self.connection.launch(lat, lon).await
    }
}

/// Decide whether a launch may go out given the current store state.
///
/// Runs on the connection manager's event loop, so the check and the send
/// cannot be interleaved with another launch or a connectivity change.
pub(crate) fn admit_launch(state: &StoreState, lat: f64, lon: f64) -> Result<Command, ClientError> {
    Position::new(lat, lon).map_err(|_| ClientError::InvalidCoordinates { lat, lon })?;
    if state.mission == MissionPhase::Active {
        return Err(ClientError::AlreadyLaunched);
    }
    if !state.connectivity.is_connected() {
        return Err(ClientError::CoreOffline);
    }
    Ok(Command::Launch { lat, lon })
}
