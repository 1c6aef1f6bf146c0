use controller::simulation;
use shared_resources::config::SimulationConfig;
use shared_resources::error::Result;
use shared_resources::logger;

fn main() -> Result<()> {
    let args = SimulationConfig::env_args();
    logger::init_logger(SimulationConfig::verbose_requested(&args));

    // READ CONFIGURATION
    let config = SimulationConfig::load(&args)?;
    tracing::debug!("configuration: {:?}", config);

    // RUN SIMULATION
    let report = simulation::run(&config)?;

    tracing::info!(
        passengers = report.passengers_served,
        requests = report.requests,
        elapsed_ms = report.elapsed_ms,
        "simulation finished"
    );
    if !report.shutdown.is_clean() {
        tracing::warn!("cars {:?} did not stop in time", report.shutdown.cancelled);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
