//! Headless runner for the multi-species Game of Life.

mod driver;
mod telemetry;

use anyhow::Result;
use life_core::RunnerConfig;
use life_world::Simulation;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    telemetry::init_telemetry()?;

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            RunnerConfig::from_json_file(&path)?
        }
        None => RunnerConfig::default(),
    };

    info!(
        "Starting simulation on a {}x{} board with {} species",
        config.world.width, config.world.height, config.world.species_count
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let simulation = Simulation::new(config.world.clone(), tx)?;

    let mut driver = driver::Driver::new(config, simulation, rx);
    driver.prepare();

    let summary = driver.run(shutdown_signal()).await;

    info!(
        generations = summary.generations,
        dropped_requests = summary.dropped_requests,
        final_population = summary.final_population,
        "Run finished in {:.2}s",
        summary.elapsed.as_secs_f64()
    );
    debug!("Final board:\n{}", driver.simulation().current_grid());

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
