//! Operator console for the Sky-Link simulation core.
//!
//! Streams live telemetry to the terminal and optionally launches a mission
//! over one of the lobby target cities once the core is reachable.

use clap::Parser;
use skylink_cli::{render_header, render_snapshot, TargetZone};
use skylink_client::{ClientConfig, ClientError, TelemetryClient};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Live telemetry console for the drone simulation core
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Simulation core websocket URL (default: $SKYLINK_WS_URL or ws://localhost:8000/ws/simulation)
    #[arg(long)]
    url: Option<String>,

    /// Delay between reconnect attempts in milliseconds
    #[arg(long)]
    reconnect_ms: Option<u64>,

    /// Lobby target city to launch over
    #[arg(long, value_enum, default_value = "new-york")]
    city: TargetZone,

    /// Custom launch latitude (overrides --city)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Custom launch longitude (overrides --city)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Launch the mission as soon as the core is online
    #[arg(long)]
    launch: bool,

    /// Print snapshots as JSON lines instead of the HUD
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skylink_client=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.url.clone() {
        config.endpoint = url;
    }
    if let Some(ms) = args.reconnect_ms {
        config.reconnect_delay = Duration::from_millis(ms);
    }

    let (lat, lon) = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => args.city.coordinates(),
    };

    println!("SKY-LINK V2 - virtual drone telemetry");
    println!("Target city: {} ({:.4}, {:.4})", args.city.name(), lat, lon);

    let client = TelemetryClient::connect(config).await?;

    if args.launch {
        let commands = client.commands().clone();
        let mut online = client.store().watch();
        tokio::spawn(async move {
            let reachable = online.wait_for(|s| s.connectivity.is_connected()).await.is_ok();
            if !reachable {
                return;
            }
            match commands.launch(lat, lon).await {
                Ok(()) => println!("Mission launched at ({:.4}, {:.4})", lat, lon),
                Err(ClientError::CoreOffline) => {
                    eprintln!("Simulation core offline. Cannot launch.")
                }
                Err(e) => eprintln!("Launch failed: {}", e),
            }
        });
    }

    let mut updates = client.store().watch();
    let mut last_header = String::new();
    let mut last_update = None;
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *updates.borrow_and_update();

                let header = render_header(&state);
                if header != last_header {
                    println!("{}", header);
                    last_header = header;
                }

                if state.last_update != last_update {
                    last_update = state.last_update;
                    if let Some(snapshot) = state.snapshot {
                        if args.json {
                            println!("{}", serde_json::to_string(&snapshot)?);
                        } else {
                            println!("{}", render_snapshot(&snapshot));
                        }
                    }
                }
            }
        }
    }

    client.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn city_selects_lobby_target() {
        let args = Args::try_parse_from(["skylink", "--city", "tokyo", "--launch"]).unwrap();
        assert_eq!(args.city, TargetZone::Tokyo);
        assert!(args.launch);

        let args = Args::try_parse_from(["skylink"]).unwrap();
        assert_eq!(args.city, TargetZone::NewYork);
    }

    #[test]
    fn custom_coordinates_come_in_pairs() {
        let args = Args::try_parse_from(["skylink", "--lat", "-33.86", "--lon", "151.2"]).unwrap();
        assert_eq!((args.lat, args.lon), (Some(-33.86), Some(151.2)));
        assert!(Args::try_parse_from(["skylink", "--lat", "10"]).is_err());
        assert!(Args::try_parse_from(["skylink", "--zone", "tokyo"]).is_err());
    }
}
