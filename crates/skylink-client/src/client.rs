//! Sky-Link client: wires the store, connection manager and command channel.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::command::CommandChannel;
use crate::config::ClientConfig;
use crate::connection::{ConnectionHandle, ConnectionManager};
use crate::error::ClientError;
use crate::store::TelemetryStore;
use crate::transport::{Connector, WsConnector};

/// Client for the simulation core's telemetry stream.
///
/// Dropping the client aborts its event loop, which closes the link and
/// cancels any pending reconnect. Prefer [`TelemetryClient::shutdown`] for a
/// clean websocket close.
pub struct TelemetryClient {
    store: TelemetryStore,
    connection: ConnectionHandle,
    commands: CommandChannel,
    task: Option<JoinHandle<()>>,
}

impl TelemetryClient {
    /// Spawn the connection manager without connecting yet.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Result<Self, ClientError> {
        let config = config.validate()?;
        let store = TelemetryStore::new();
        let (manager, connection) = ConnectionManager::new(config, connector, store.clone());
        let task = tokio::spawn(manager.run());

        Ok(Self {
            store,
            commands: CommandChannel::new(connection.clone()),
            connection,
            task: Some(task),
        })
    }

    /// Spawn over a real websocket and start connecting.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Self::new(config, Arc::new(WsConnector))?;
        client.connection.start().await?;
        Ok(client)
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    pub fn commands(&self) -> &CommandChannel {
        &self.commands
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Close the link, cancel reconnects and wait for the event loop to exit.
    pub async fn shutdown(mut self) {
        let _ = self.connection.shutdown().await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Connection manager task failed: {}", e);
            }
        }
    }
}

impl Drop for TelemetryClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
