//! Text heads-up display for the operator console.

use skylink_client::StoreState;
use skylink_core::{DroneStatus, LinkIndicator, TelemetrySnapshot};

/// Battery display band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryBand {
    /// Above 50%
    Nominal,
    /// Above 20%
    Low,
    Critical,
}

impl BatteryBand {
    pub fn from_level(level: f64) -> Self {
        if level > 50.0 {
            BatteryBand::Nominal
        } else if level > 20.0 {
            BatteryBand::Low
        } else {
            BatteryBand::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatteryBand::Nominal => "NOMINAL",
            BatteryBand::Low => "LOW",
            BatteryBand::Critical => "CRITICAL",
        }
    }
}

pub fn render_snapshot(snapshot: &TelemetrySnapshot) -> String {
    let status = match snapshot.status() {
        // Recharging gets flagged so it stands out in a scrolling log
        DroneStatus::Recharging => format!("*{}*", snapshot.status()),
        other => other.to_string(),
    };
    format!(
        "{:<12} ALT {:>4.0} m  SPD {:>3.0} km/h  PWR {:>3.0}% [{}]  POS {:.5}, {:.5}",
        status,
        snapshot.altitude_m(),
        snapshot.speed_kmh(),
        snapshot.battery_level(),
        BatteryBand::from_level(snapshot.battery_level()).label(),
        snapshot.latitude(),
        snapshot.longitude(),
    )
}

/// Header line: link indicator plus the blocking alert when raised.
pub fn render_header(state: &StoreState) -> String {
    let alerts = state.alerts();
    let link = match alerts.indicator {
        LinkIndicator::Online => "ONLINE",
        LinkIndicator::Offline => "OFFLINE",
    };
    if alerts.signal_lost {
        format!("SKY-LINK V2 [{link}] SIGNAL LOST - reconnecting to core...")
    } else {
        format!("SKY-LINK V2 [{link}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skylink_core::{decode, ConnectivityPhase, MissionPhase};

    #[test]
    fn battery_bands_follow_thresholds() {
        assert_eq!(BatteryBand::from_level(87.0), BatteryBand::Nominal);
        assert_eq!(BatteryBand::from_level(50.0), BatteryBand::Low);
        assert_eq!(BatteryBand::from_level(20.5), BatteryBand::Low);
        assert_eq!(BatteryBand::from_level(20.0), BatteryBand::Critical);
        assert_eq!(BatteryBand::from_level(0.0), BatteryBand::Critical);
    }

    #[test]
    fn renders_snapshot_line() {
        let snapshot = decode(
            r#"{"latitude":40.71,"longitude":-74.0,"altitude":120,"speed":40,"battery_level":87,"status":"FLYING"}"#,
        )
        .unwrap();
        let line = render_snapshot(&snapshot);
        assert!(line.starts_with("FLYING"));
        assert!(line.contains("ALT  120 m"));
        assert!(line.contains("SPD  40 km/h"));
        assert!(line.contains("PWR  87% [NOMINAL]"));
    }

    #[test]
    fn recharging_is_highlighted() {
        let snapshot = decode(
            r#"{"latitude":0,"longitude":0,"altitude":0,"speed":0,"battery_level":4,"status":"RECHARGING"}"#,
        )
        .unwrap();
        assert!(render_snapshot(&snapshot).starts_with("*RECHARGING*"));
    }

    #[test]
    fn header_shows_signal_lost_only_mid_mission() {
        let mut state = StoreState::default();
        assert_eq!(render_header(&state), "SKY-LINK V2 [OFFLINE]");

        state.mission = MissionPhase::Active;
        assert!(render_header(&state).contains("SIGNAL LOST"));

        state.connectivity = ConnectivityPhase::Connected;
        assert_eq!(render_header(&state), "SKY-LINK V2 [ONLINE]");
    }
}
