/// ----- SIMULATION -----
/// Drives a building full of passengers through the dispatcher. Every
/// passenger travels from the ground floor to a random floor and back. A
/// random passenger who is neither waiting nor riding asks for a car each
/// round, until everyone has finished.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use shared_resources::config::SimulationConfig;
use shared_resources::error::Result;

use crate::debug::Debug;
use crate::dispatcher::{Dispatcher, ShutdownReport};
use crate::passenger::Passenger;

const BUSY_POLL: Duration = Duration::from_millis(5);

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub passengers_served: u32,
    pub requests: u32,
    pub elapsed_ms: u64,
    pub shutdown: ShutdownReport,
}

pub fn run(config: &SimulationConfig) -> Result<SimulationReport> {
    run_with_rng(config, &mut rand::thread_rng())
}

pub fn run_with_rng<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Result<SimulationReport> {
    config.validate()?;
    let started = Instant::now();
    let dispatcher = Dispatcher::from_config(&config.elevator)?;
    let num_floors = config.elevator.num_floors;

    let passengers: Vec<Arc<Passenger>> = (0..config.simulation.num_passengers)
        .map(|id| Arc::new(Passenger::with_trip(id, [0, rng.gen_range(1..num_floors), 0])))
        .collect();
    tracing::info!(
        passengers = passengers.len(),
        elevators = dispatcher.elevators().len(),
        floors = num_floors,
        "simulation started"
    );

    let outcome = serve_passengers(&dispatcher, passengers, config, rng);
    let shutdown = dispatcher.stop();
    let (passengers_served, requests) = outcome?;

    Ok(SimulationReport {
        passengers_served,
        requests,
        elapsed_ms: started.elapsed().as_millis() as u64,
        shutdown,
    })
}

fn serve_passengers<R: Rng>(
    dispatcher: &Dispatcher,
    mut passengers: Vec<Arc<Passenger>>,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<(u32, u32)> {
    let mut debug = config.simulation.debug.then(Debug::new);
    let (mut served, mut requests) = (0, 0);

    while !passengers.is_empty() {
        let index = rng.gen_range(0..passengers.len());
        let passenger = &passengers[index];

        if passenger.is_waiting() || passenger.is_in_elevator() {
            thread::sleep(BUSY_POLL);
            continue;
        }

        let (Some(floor), Some(direction)) = (passenger.current_floor(), passenger.requested_direction()) else {
            tracing::info!(passenger = passenger.id(), "passenger has finished the trip");
            passengers.swap_remove(index);
            served += 1;
            continue;
        };

        let car = dispatcher.request_elevator(floor, direction)?;
        passenger.assign_elevator(&car);
        requests += 1;

        if let Some(debug) = debug.as_mut() {
            let statuses: Vec<_> = dispatcher.elevators().iter().map(|car| car.status()).collect();
            for status in &statuses {
                if let Ok(json) = status.as_json() {
                    tracing::debug!("{}", json);
                }
            }
            debug.printstatus(&statuses)?;
        }

        thread::sleep(config.simulation.request_interval());
    }
    Ok((served, requests))
}
