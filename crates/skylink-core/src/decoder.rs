//! Inbound frame decoding.
//!
//! Turns one raw frame from the simulation core into a [`TelemetrySnapshot`]
//! or rejects it. Decoding is pure: logging, counting and state updates are
//! left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DroneStatus, Position, TelemetrySnapshot};

/// Why a frame was rejected as a malformed payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON, a required field is missing, a field has the wrong type,
    /// or `status` is not a known value.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed payload: binary frame is not valid UTF-8")]
    NotUtf8,
    #[error("malformed payload: {field} is not finite")]
    NonFinite { field: &'static str },
    #[error("malformed payload: {field} out of range ({value})")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Telemetry frame exactly as the simulation core pushes it.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct WireFrame {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed: f64,
    battery_level: f64,
    status: DroneStatus,
}

impl From<TelemetrySnapshot> for WireFrame {
    fn from(snapshot: TelemetrySnapshot) -> Self {
        Self {
            latitude: snapshot.latitude(),
            longitude: snapshot.longitude(),
            altitude: snapshot.altitude_m(),
            speed: snapshot.speed_kmh(),
            battery_level: snapshot.battery_level(),
            status: snapshot.status(),
        }
    }
}

impl TryFrom<WireFrame> for TelemetrySnapshot {
    type Error = DecodeError;

    fn try_from(frame: WireFrame) -> Result<Self, Self::Error> {
        let position = Position::new(frame.latitude, frame.longitude)?;
        TelemetrySnapshot::new(
            position,
            frame.altitude,
            frame.speed,
            frame.battery_level,
            frame.status,
        )
    }
}

/// Decode a text frame.
pub fn decode(raw: &str) -> Result<TelemetrySnapshot, DecodeError> {
    let frame: WireFrame = serde_json::from_str(raw)?;
    TelemetrySnapshot::try_from(frame)
}

/// Decode a binary frame carrying UTF-8 JSON.
pub fn decode_bytes(raw: &[u8]) -> Result<TelemetrySnapshot, DecodeError> {
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::NotUtf8)?;
    decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"latitude":40.71,"longitude":-74.0,"altitude":120,"speed":40,"battery_level":87,"status":"FLYING"}"#;

    #[test]
    fn decodes_valid_frame() {
        let snapshot = decode(VALID).unwrap();
        assert_eq!(snapshot.latitude(), 40.71);
        assert_eq!(snapshot.longitude(), -74.0);
        assert_eq!(snapshot.altitude_m(), 120.0);
        assert_eq!(snapshot.speed_kmh(), 40.0);
        assert_eq!(snapshot.battery_level(), 87.0);
        assert_eq!(snapshot.status(), DroneStatus::Flying);
    }

    #[test]
    fn snapshot_serializes_as_wire_frame() {
        let snapshot = decode(VALID).unwrap();
        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "latitude": 40.71,
                "longitude": -74.0,
                "altitude": 120.0,
                "speed": 40.0,
                "battery_level": 87.0,
                "status": "FLYING"
            })
        );
        assert_eq!(decode(&value.to_string()).unwrap(), snapshot);
    }

    #[test]
    fn ignores_unknown_fields() {
        let raw = r#"{"latitude":0,"longitude":0,"altitude":0,"speed":0,"battery_level":100,"status":"IDLE","heading":12}"#;
        assert_eq!(decode(raw).unwrap().status(), DroneStatus::Idle);
    }

    #[test]
    fn rejects_plain_text() {
        assert!(matches!(decode("not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn rejects_missing_field() {
        let raw = r#"{"latitude":40.71,"longitude":-74.0,"altitude":120,"speed":40,"status":"FLYING"}"#;
        assert!(matches!(decode(raw), Err(DecodeError::Json(_))));
    }

    #[test]
    fn rejects_stringly_typed_number() {
        let raw = r#"{"latitude":"40.71","longitude":-74.0,"altitude":120,"speed":40,"battery_level":87,"status":"FLYING"}"#;
        assert!(matches!(decode(raw), Err(DecodeError::Json(_))));
    }

    #[test]
    fn rejects_status_from_other_schema() {
        let raw = r#"{"latitude":40.71,"longitude":-74.0,"altitude":120,"speed":40,"battery_level":87,"status":"RETURN_TO_HOME"}"#;
        assert!(matches!(decode(raw), Err(DecodeError::Json(_))));
    }

    #[test]
    fn rejects_latitude_out_of_range() {
        let raw = r#"{"latitude":91,"longitude":0,"altitude":0,"speed":0,"battery_level":50,"status":"IDLE"}"#;
        assert!(matches!(
            decode(raw),
            Err(DecodeError::OutOfRange {
                field: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn rejects_negative_speed() {
        let raw = r#"{"latitude":0,"longitude":0,"altitude":0,"speed":-1,"battery_level":50,"status":"IDLE"}"#;
        assert!(matches!(
            decode(raw),
            Err(DecodeError::OutOfRange { field: "speed", .. })
        ));
    }

    #[test]
    fn binary_frames_decode_like_text() {
        assert!(decode_bytes(VALID.as_bytes()).is_ok());
        assert!(matches!(
            decode_bytes(&[0xff, 0xfe, 0x00]),
            Err(DecodeError::NotUtf8)
        ));
    }
}
