// Impact Sim - Meteor impact consequence simulator
// Library entry point shared by the CLI and tests

pub mod api_client;
pub mod cli;
pub mod config;
pub mod consequences;
pub mod error;
pub mod geology_client;
pub mod parameters;
pub mod physics_engine;
pub mod report;
pub mod state_manager;
pub mod upstream;

pub use consequences::{assess_impact, ImpactResult};
pub use error::{ImpactError, ValidationError};
pub use parameters::{normalize, ImpactParameters, SimulationRequest};
pub use state_manager::{advanced_simulate, ApiResponse, AppState, LiveState};

/// Parse arguments and run one command
pub async fn run() -> anyhow::Result<()> {
    cli::run().await
}
