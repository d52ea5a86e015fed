//! Simulation runner binary

use simulation::{SimulationConfig, SimulationEngine};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting interbank payment network simulation");

    // Load configuration: a TOML path as first argument, otherwise
    // defaults with environment overrides.
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::from_env()?,
    };

    let engine = SimulationEngine::new(config)?;
    let report = engine.run().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("Simulation finished");
    Ok(())
}
