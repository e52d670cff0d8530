//! Connection manager: owns the one streaming link to the simulation core.
//!
//! Everything that can change client state arrives as an event on a single
//! task: operator requests, connect completions, inbound frames and the
//! reconnect timer. They are handled one at a time. When several sources
//! are ready at once `select!` picks one at random, so a busy request queue
//! cannot starve inbound frames.
//!
//! ```text
//!  start ──> CONNECTING ──ok──> CONNECTED ──close/error──> DISCONNECTED
//!               └──err/timeout──────────────────────────────> DISCONNECTED
//!
//!  DISCONNECTED ──reconnect timer (fixed delay)──> attempt ──ok──> CONNECTED
//!       ^                                             │
//!       └───────────────────err/timeout───────────────┘
//! ```
//!
//! Only the first attempt after `start` reports CONNECTING. Retries after a
//! loss stay DISCONNECTED until they succeed, so a mid-mission signal-lost
//! alert holds for the whole outage.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use skylink_core::{decode, decode_bytes, Command, ConnectivityPhase};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout, Sleep};

use crate::command;
use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::store::TelemetryStore;
use crate::transport::{Connector, FrameSink, FrameStream, Inbound, Link};

const REQUEST_QUEUE_DEPTH: usize = 64;

type Reply = oneshot::Sender<Result<(), ClientError>>;

enum Request {
    Start,
    Stop { done: oneshot::Sender<()> },
    Send { command: Command, reply: Reply },
    Launch { lat: f64, lon: f64, reply: Reply },
    Shutdown,
}

/// Cheap, cloneable front door to the connection manager task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    requests: mpsc::Sender<Request>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Start => f.write_str("Start"),
            Request::Stop { .. } => f.write_str("Stop"),
            Request::Send { command, .. } => write!(f, "Send({command:?})"),
            Request::Launch { lat, lon, .. } => write!(f, "Launch({lat}, {lon})"),
            Request::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl ConnectionHandle {
    /// Begin connecting. A no-op if the manager is already running.
    pub async fn start(&self) -> Result<(), ClientError> {
        self.submit(Request::Start).await
    }

    /// Close the link and cancel any pending reconnect.
    ///
    /// Resolves once the manager has torn everything down.
    pub async fn stop(&self) -> Result<(), ClientError> {
        let (done, rx) = oneshot::channel();
        self.submit(Request::Stop { done }).await?;
        rx.await.map_err(|_| ClientError::ClientStopped)
    }

    /// Forward a command while connected; fails with `NotConnected` otherwise.
    pub async fn send(&self, command: Command) -> Result<(), ClientError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Request::Send { command, reply }).await?;
        rx.await.map_err(|_| ClientError::ClientStopped)?
    }

    pub(crate) async fn launch(&self, lat: f64, lon: f64) -> Result<(), ClientError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Request::Launch { lat, lon, reply }).await?;
        rx.await.map_err(|_| ClientError::ClientStopped)?
    }

    pub(crate) async fn shutdown(&self) -> Result<(), ClientError> {
        self.submit(Request::Shutdown).await
    }

    async fn submit(&self, request: Request) -> Result<(), ClientError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| ClientError::ClientStopped)
    }
}

/// State machine behind a [`ConnectionHandle`].
pub struct ConnectionManager {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    store: TelemetryStore,
    requests: mpsc::Receiver<Request>,
    /// False after `stop()`: disconnects no longer schedule reconnects
    running: bool,
    pending_connect: Option<BoxFuture<'static, Result<Link, TransportError>>>,
    inbound: Option<FrameStream>,
    outbound: Option<FrameSink>,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
}

impl ConnectionManager {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        store: TelemetryStore,
    ) -> (Self, ConnectionHandle) {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let manager = Self {
            config,
            connector,
            store,
            requests: rx,
            running: false,
            pending_connect: None,
            inbound: None,
            outbound: None,
            reconnect_timer: None,
        };
        (manager, ConnectionHandle { requests: tx })
    }

    /// Run the event loop until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    match request {
                        Some(Request::Shutdown) | None => break,
                        Some(request) => self.handle_request(request).await,
                    }
                }
                result = connect_outcome(&mut self.pending_connect) => {
                    self.pending_connect = None;
                    self.on_connect_result(result);
                }
                frame = next_frame(&mut self.inbound) => {
                    self.on_frame(frame);
                }
                _ = timer_fired(&mut self.reconnect_timer) => {
                    self.reconnect_timer = None;
                    tracing::debug!("Reconnect timer fired");
                    self.begin_connect();
                }
            }
        }

        self.teardown().await;
        tracing::info!("Connection manager shutting down");
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Start => {
                if self.running {
                    return;
                }
                self.running = true;
                self.store.set_connectivity(ConnectivityPhase::Connecting);
                self.begin_connect();
            }
            Request::Stop { done } => {
                self.teardown().await;
                tracing::info!("Connection stopped");
                let _ = done.send(());
            }
            Request::Send { command, reply } => {
                let result = self.transmit(&command).await;
                let _ = reply.send(result);
            }
            Request::Launch { lat, lon, reply } => {
                let result = self.launch(lat, lon).await;
                let _ = reply.send(result);
            }
            // Handled by the loop itself
            Request::Shutdown => {}
        }
    }

    /// Start a fresh attempt, tearing down whatever came before it.
    ///
    /// Leaves the connectivity phase alone; `Start` reports CONNECTING itself.
    fn begin_connect(&mut self) {
        self.reconnect_timer = None;
        self.inbound = None;
        self.outbound = None;

        self.store.record_connect_attempt();
        tracing::info!("Connecting to simulation core at {}", self.config.endpoint);

        let connect = self.connector.connect(&self.config.endpoint);
        let limit = self.config.connect_timeout;
        self.pending_connect = Some(Box::pin(async move {
            match timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::ConnectTimeout(limit)),
            }
        }));
    }

    fn on_connect_result(&mut self, result: Result<Link, TransportError>) {
        match result {
            Ok(link) => {
                self.inbound = Some(link.inbound);
                self.outbound = Some(link.outbound);
                self.store.set_connectivity(ConnectivityPhase::Connected);
                tracing::info!("Connected to simulation core");
            }
            Err(e) => self.on_disconnect(e),
        }
    }

    fn on_frame(&mut self, frame: Option<Result<Inbound, TransportError>>) {
        let decoded = match frame {
            Some(Ok(Inbound::Text(text))) => decode(&text),
            Some(Ok(Inbound::Binary(data))) => decode_bytes(&data),
            Some(Ok(Inbound::Closed)) | None => return self.on_disconnect(TransportError::Closed),
            Some(Err(e)) => return self.on_disconnect(e),
        };

        match decoded {
            Ok(snapshot) => {
                tracing::debug!(
                    status = %snapshot.status(),
                    battery = snapshot.battery_level(),
                    "Telemetry frame accepted"
                );
                self.store.apply_snapshot(snapshot);
            }
            Err(e) => {
                tracing::warn!("Dropping telemetry frame: {}", e);
                self.store.record_rejected_frame();
            }
        }
    }

    fn on_disconnect(&mut self, reason: TransportError) {
        self.inbound = None;
        self.outbound = None;
        self.pending_connect = None;
        self.store.set_connectivity(ConnectivityPhase::Disconnected);

        if !self.running {
            return;
        }

        let delay = self.config.reconnect_delay;
        tracing::warn!("Simulation core link lost ({}); retrying in {:?}", reason, delay);
        // Replacing the handle drops any stale timer.
        self.reconnect_timer = Some(Box::pin(sleep(delay)));
    }

    async fn transmit(&mut self, command: &Command) -> Result<(), ClientError> {
        if !self.store.connectivity().is_connected() {
            return Err(ClientError::NotConnected);
        }
        let sink = self.outbound.as_mut().ok_or(ClientError::NotConnected)?;
        let text = command.to_json()?;

        let limit = self.config.send_timeout;
        let sent = match timeout(limit, sink.send(text)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::SendTimeout(limit)),
        };
        if let Err(e) = sent {
            tracing::warn!("Failed to send {:?}: {}", command, e);
            self.on_disconnect(e);
            return Err(ClientError::NotConnected);
        }
        tracing::info!("Sent {:?}", command);
        Ok(())
    }

    async fn launch(&mut self, lat: f64, lon: f64) -> Result<(), ClientError> {
        let launch = command::admit_launch(&self.store.state(), lat, lon)?;
        self.transmit(&launch).await.map_err(|e| match e {
            ClientError::NotConnected => ClientError::CoreOffline,
            other => other,
        })?;
        self.store.activate_mission();
        tracing::info!("Mission launched at ({}, {})", lat, lon);
        Ok(())
    }

    async fn teardown(&mut self) {
        self.running = false;
        self.reconnect_timer = None;
        self.pending_connect = None;
        self.inbound = None;
        if let Some(mut sink) = self.outbound.take() {
            match timeout(self.config.send_timeout, sink.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("Error closing link: {}", e),
                Err(_) => tracing::debug!("Link close timed out, dropping it"),
            }
        }
        self.store.set_connectivity(ConnectivityPhase::Disconnected);
    }
}

async fn connect_outcome(
    pending: &mut Option<BoxFuture<'static, Result<Link, TransportError>>>,
) -> Result<Link, TransportError> {
    match pending {
        Some(connect) => connect.await,
        None => pending_forever().await,
    }
}

async fn next_frame(inbound: &mut Option<FrameStream>) -> Option<Result<Inbound, TransportError>> {
    match inbound {
        Some(stream) => stream.next().await,
        None => pending_forever().await,
    }
}

async fn timer_fired(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.await,
        None => pending_forever().await,
    }
}

async fn pending_forever<T>() -> T {
    pending().await
}
