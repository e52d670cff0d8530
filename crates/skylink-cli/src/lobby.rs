//! Pre-defined launch target zones offered in the lobby.

use clap::ValueEnum;
use serde::Serialize;

/// Target zones the operator can launch a mission over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetZone {
    #[default]
    NewYork,
    London,
    Tokyo,
    Mumbai,
}

impl TargetZone {
    pub const ALL: [TargetZone; 4] = [
        TargetZone::NewYork,
        TargetZone::London,
        TargetZone::Tokyo,
        TargetZone::Mumbai,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TargetZone::NewYork => "New York",
            TargetZone::London => "London",
            TargetZone::Tokyo => "Tokyo",
            TargetZone::Mumbai => "Mumbai",
        }
    }

    /// Orbit center as (lat, lon) in degrees.
    pub fn coordinates(self) -> (f64, f64) {
        match self {
            TargetZone::NewYork => (40.7128, -74.0060),
            TargetZone::London => (51.5074, -0.1278),
            TargetZone::Tokyo => (35.6762, 139.6503),
            TargetZone::Mumbai => (19.0760, 72.8777),
        }
    }

    /// Coordinate readout as shown under the zone picker.
    pub fn readout(self) -> String {
        let (lat, lon) = self.coordinates();
        format!("COORD: {:.4}, {:.4}", lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_york_is_default_zone() {
        assert_eq!(TargetZone::default(), TargetZone::NewYork);
        assert_eq!(TargetZone::default().readout(), "COORD: 40.7128, -74.0060");
    }

    #[test]
    fn every_zone_is_a_valid_position() {
        for zone in TargetZone::ALL {
            let (lat, lon) = zone.coordinates();
            assert!(skylink_core::Position::new(lat, lon).is_ok(), "{}", zone.name());
        }
    }
}
