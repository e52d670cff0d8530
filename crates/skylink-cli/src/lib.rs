//! Sky-Link CLI - operator console for the simulation core.
//!
//! Lobby target zones and the text HUD used by the `skylink` binary.

pub mod hud;
pub mod lobby;

pub use hud::{render_header, render_snapshot, BatteryBand};
pub use lobby::TargetZone;
