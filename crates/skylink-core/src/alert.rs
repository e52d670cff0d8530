//! Operator alerting derived from mission and connectivity phases.
//!
//! Nothing here holds state: every value is recomputed from the current
//! phases, so an alert clears as soon as the link comes back.

use serde::Serialize;

use crate::models::{ConnectivityPhase, MissionPhase};

/// Header link indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkIndicator {
    Online,
    /// Disconnected or still connecting
    Offline,
}

impl LinkIndicator {
    pub fn from_connectivity(connectivity: ConnectivityPhase) -> Self {
        if connectivity.is_connected() {
            LinkIndicator::Online
        } else {
            LinkIndicator::Offline
        }
    }
}

/// Blocking "signal lost" condition: a mission is running and the link is down.
///
/// Losing the link while still in the lobby does not raise it. Retries after
/// a loss are reported as DISCONNECTED, so the alert stays up until a retry
/// actually reconnects.
pub fn signal_lost(mission: MissionPhase, connectivity: ConnectivityPhase) -> bool {
    mission == MissionPhase::Active && connectivity == ConnectivityPhase::Disconnected
}

/// Everything the presentation layer needs to decide what to overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub indicator: LinkIndicator,
    pub signal_lost: bool,
    pub lobby_visible: bool,
}

impl AlertView {
    pub fn derive(mission: MissionPhase, connectivity: ConnectivityPhase) -> Self {
        Self {
            indicator: LinkIndicator::from_connectivity(connectivity),
            signal_lost: signal_lost(mission, connectivity),
            lobby_visible: mission == MissionPhase::Lobby,
        }
    }
}
