//! Sky-Link Core - telemetry domain for the mission-control client
//!
//! Pure, I/O-free pieces shared by the client and the operator console:
//! snapshot models, frame decoding and the signal-lost alert rule.

pub mod alert;
pub mod decoder;
pub mod models;

pub use alert::{signal_lost, AlertView, LinkIndicator};
pub use decoder::{decode, decode_bytes, DecodeError};
pub use models::{
    Command, ConnectivityPhase, DroneStatus, MissionPhase, Position, TelemetrySnapshot,
};
