//! Core data models for the Sky-Link telemetry client.

use serde::{Deserialize, Serialize};

use crate::decoder::DecodeError;

/// Flight state reported by the simulation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    /// Airborne and following the mission orbit
    Flying,
    /// Landed with an empty battery, charging before resuming
    Recharging,
    /// On the ground, no mission running
    Idle,
}

impl DroneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DroneStatus::Flying => "FLYING",
            DroneStatus::Recharging => "RECHARGING",
            DroneStatus::Idle => "IDLE",
        }
    }
}

impl std::fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Build a position, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DecodeError> {
        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// One fully validated telemetry reading.
///
/// Fields are private: the only way to obtain a snapshot is through
/// [`TelemetrySnapshot::new`] (or the decoder, which calls it), so a
/// half-filled or out-of-range snapshot cannot exist.
///
/// Serializes back into the same flat frame the simulation core emits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "crate::decoder::WireFrame")]
pub struct TelemetrySnapshot {
    position: Position,
    /// Meters above ground
    altitude_m: f64,
    /// Ground speed in km/h
    speed_kmh: f64,
    /// Percentage, 0-100
    battery_level: f64,
    status: DroneStatus,
}

impl TelemetrySnapshot {
    pub fn new(
        position: Position,
        altitude_m: f64,
        speed_kmh: f64,
        battery_level: f64,
        status: DroneStatus,
    ) -> Result<Self, DecodeError> {
        check_range("altitude", altitude_m, 0.0, f64::MAX)?;
        check_range("speed", speed_kmh, 0.0, f64::MAX)?;
        check_range("battery_level", battery_level, 0.0, 100.0)?;
        Ok(Self {
            position,
            altitude_m,
            speed_kmh,
            battery_level,
            status,
        })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn latitude(&self) -> f64 {
        self.position.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn battery_level(&self) -> f64 {
        self.battery_level
    }

    pub fn status(&self) -> DroneStatus {
        self.status
    }
}

/// Lifecycle of the single streaming transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectivityPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectivityPhase {
    pub fn is_connected(self) -> bool {
        self == ConnectivityPhase::Connected
    }
}

/// Whether the operator has committed to a mission.
///
/// Moves from `Lobby` to `Active` once and never back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionPhase {
    #[default]
    Lobby,
    Active,
}

/// Outbound operator command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Start the mission orbit around the given coordinates
    Launch { lat: f64, lon: f64 },
}

impl Command {
    /// Encode the command as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), DecodeError> {
    if !value.is_finite() {
        return Err(DecodeError::NonFinite { field });
    }
    if value < min || value > max {
        return Err(DecodeError::OutOfRange { field, value });
    }
    Ok(())
}
