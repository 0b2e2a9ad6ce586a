// Command-line surface
// Each subcommand maps onto one request handler and prints its JSON envelope

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::parameters::{AsteroidImpactRequest, NumericInput, SimulationRequest};
use crate::report::{render_report, sample_scenarios};
use crate::state_manager::{advanced_simulate, ApiResponse, LiveState};

#[derive(Parser)]
#[command(
    name = "impact-sim",
    author,
    version,
    about = "Meteor impact consequence simulator"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Custom impactor with atmospheric entry profile (offline)
    Advanced {
        /// Diameter in meters (default 100)
        #[arg(long, allow_hyphen_values = true)]
        diameter: Option<String>,
        /// Entry velocity in km/s (default 20)
        #[arg(long, allow_hyphen_values = true)]
        velocity: Option<String>,
        /// Bulk density in kg/m³ (default 3000)
        #[arg(long, allow_hyphen_values = true)]
        density: Option<String>,
        /// Entry angle in degrees (default 45)
        #[arg(long, allow_hyphen_values = true)]
        angle: Option<String>,
        /// Impact point as "lat, lon" (default Mexico City)
        #[arg(long, allow_hyphen_values = true)]
        location: Option<String>,
    },
    /// Catalogued asteroid from the NEO feed striking a point
    Simulate {
        /// Feed id or name
        #[arg(long)]
        asteroid_id: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<String>,
    },
    /// Recent close approaches, largest first
    Recent,
    /// Largest recent asteroids against major cities
    ThreatMap,
    /// Aggregate statistics over the recent feed
    Summary,
    /// Text report over the built-in sample scenarios (offline)
    Report,
}

fn numeric(raw: Option<String>) -> Option<NumericInput> {
    raw.map(NumericInput::Text)
}

fn emit(response: ApiResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if response.is_success() {
        Ok(())
    } else {
        anyhow::bail!("request failed with status {}", response.status)
    }
}

fn live_state() -> anyhow::Result<LiveState> {
    let config = AppConfig::from_env().context("loading configuration")?;
    LiveState::from_config(config).context("building API clients")
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Advanced {
            diameter,
            velocity,
            density,
            angle,
            location,
        } => emit(advanced_simulate(&SimulationRequest {
            diameter: numeric(diameter),
            velocity: numeric(velocity),
            density: numeric(density),
            angle: numeric(angle),
            location,
        })),
        Command::Simulate {
            asteroid_id,
            latitude,
            longitude,
        } => {
            let state = live_state()?;
            let request = AsteroidImpactRequest {
                asteroid_id: Some(asteroid_id),
                latitude: numeric(latitude),
                longitude: numeric(longitude),
            };
            emit(state.simulate_asteroid(&request).await)
        }
        Command::Recent => emit(live_state()?.recent_neos().await),
        Command::ThreatMap => emit(live_state()?.threat_map().await),
        Command::Summary => emit(live_state()?.threat_summary().await),
        Command::Report => {
            print!("{}", render_report(&sample_scenarios(), &Local::now())?);
            Ok(())
        }
    }
}
