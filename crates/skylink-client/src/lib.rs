//! Sky-Link Client - telemetry synchronization with the simulation core
//!
//! Keeps one websocket open to the simulation core, turns inbound frames into
//! a consistent [`TelemetryStore`] view, reconnects on a fixed delay after any
//! loss of the link, and gates the operator's launch command on connectivity.

pub mod client;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod store;
pub mod transport;

pub use client::TelemetryClient;
pub use command::CommandChannel;
pub use config::ClientConfig;
pub use connection::{ConnectionHandle, ConnectionManager};
pub use error::{ClientError, TransportError};
pub use skylink_core::{
    AlertView, Command, ConnectivityPhase, DroneStatus, MissionPhase, TelemetrySnapshot,
};
pub use store::{StoreState, Subscription, TelemetryStore};
pub use transport::{Connector, FrameSink, FrameStream, Inbound, Link, WsConnector};
