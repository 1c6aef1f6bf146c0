/// ----- CAR -----
/// One elevator car: where it is, where it is heading, which floors it owes a
/// stop, and how many passengers it carries. All of that sits behind a single
/// per-car lock; listeners live behind their own lock so they can be notified
/// while the car state is free for them to call back into.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use shared_resources::direction::Direction;
use shared_resources::error::{ElevatorError, Result};

use crate::estimator::{self, Timing};
use crate::listener::{Listeners, StopEvent, StopListener};
use crate::requests::PendingStops;
use crate::status::CarStatus;

pub type CarId = u8;

#[derive(Debug, Clone)]
struct CarState {
    direction: Direction,
    floor: u8,
    stops: PendingStops,
    passengers: u32,
}

impl CarState {
    fn addressed_floor(&self) -> u8 {
        self.stops.addressed_floor(self.floor, self.direction)
    }
}

pub struct Car {
    id: CarId,
    num_floors: u8,
    timing: Timing,
    state: Mutex<CarState>,
    running: AtomicBool,
    listeners: Listeners,
}

impl Car {
    pub fn new(
        id: CarId,
        direction: Direction,
        start_floor: u8,
        num_floors: u8,
        speed_per_floor: Duration,
        avg_dwell_per_stop: Duration,
    ) -> Result<Self> {
        if num_floors == 0 {
            return Err(ElevatorError::config(format!("car {} needs at least one floor", id)));
        }
        if start_floor >= num_floors {
            return Err(ElevatorError::InvalidFloor { floor: start_floor, num_floors });
        }
        Ok(Car {
            id,
            num_floors,
            timing: Timing { speed_per_floor, avg_dwell_per_stop },
            state: Mutex::new(CarState {
                direction,
                floor: start_floor,
                stops: PendingStops::new(num_floors),
                passengers: 0,
            }),
            running: AtomicBool::new(false),
            listeners: Listeners::default(),
        })
    }

    fn check_floor(&self, floor: u8) -> Result<()> {
        if floor >= self.num_floors {
            return Err(ElevatorError::InvalidFloor { floor, num_floors: self.num_floors });
        }
        Ok(())
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn num_floors(&self) -> u8 {
        self.num_floors
    }

    pub fn speed_per_floor(&self) -> Duration {
        self.timing.speed_per_floor
    }

    pub fn avg_dwell_per_stop(&self) -> Duration {
        self.timing.avg_dwell_per_stop
    }

    pub fn current_floor(&self) -> u8 {
        self.state.lock().floor
    }

    pub fn direction(&self) -> Direction {
        self.state.lock().direction
    }

    pub fn passenger_count(&self) -> u32 {
        self.state.lock().passengers
    }

    pub fn pending_stops_at(&self, floor: u8) -> Result<u32> {
        self.check_floor(floor)?;
        Ok(self.state.lock().stops.count(floor))
    }

    pub fn addressed_floor(&self) -> u8 {
        self.state.lock().addressed_floor()
    }

    pub fn status(&self) -> CarStatus {
        let state = self.state.lock();
        CarStatus {
            id: self.id,
            floor: state.floor,
            direction: state.direction,
            addressed_floor: state.addressed_floor(),
            passengers: state.passengers,
            running: self.is_running(),
            pending_stops: state.stops.as_slice().to_vec(),
        }
    }

    /// Commits a stop at `to_floor`. Direction is corrected lazily on the
    /// next step.
    pub fn move_elevator(&self, to_floor: u8) -> Result<()> {
        self.check_floor(to_floor)?;
        self.state.lock().stops.add_stop(to_floor);
        tracing::debug!(car = self.id, floor = to_floor, "stop committed");
        Ok(())
    }

    /// Estimated time until this car can serve a request at `to_floor`
    /// travelling `direction`. Does not change any state.
    pub fn calculate_time_to_floor(&self, to_floor: u8, direction: Direction) -> Result<Duration> {
        self.check_floor(to_floor)?;
        let state = self.state.lock();
        Ok(estimator::time_to_floor(
            &state.stops,
            self.timing,
            state.floor,
            state.direction,
            to_floor,
            direction,
        ))
    }

    /// Advances at most one floor toward the addressed floor. On arrival the
    /// direction is re-evaluated and every listener hears about the stop.
    pub fn move_to_next_floor(&self) -> u8 {
        let (floor, direction, arrived) = {
            let mut state = self.state.lock();
            let addressed = state.addressed_floor();
            if addressed > state.floor {
                state.direction = Direction::Up;
                state.floor += 1;
            } else if addressed < state.floor {
                state.direction = Direction::Down;
                state.floor -= 1;
            }

            let arrived = state.floor == addressed;
            if arrived {
                state.direction = state.stops.next_direction(state.floor, state.direction);
            }
            (state.floor, state.direction, arrived)
        };

        tracing::debug!(car = self.id, floor, %direction, "car is on floor");

        if arrived {
            self.listeners.notify(&StopEvent::new(floor, self));
        }
        floor
    }

    /// A passenger at the current floor boards and asks for `to_floor`.
    pub fn enter(&self, to_floor: u8) -> Result<()> {
        self.check_floor(to_floor)?;
        let mut state = self.state.lock();
        let floor = state.floor;
        if !state.stops.clear_one(floor) {
            tracing::warn!(car = self.id, floor, "passenger entered without a pending stop");
        }
        state.stops.add_stop(to_floor);
        state.passengers += 1;
        tracing::info!(car = self.id, floor, to_floor, passengers = state.passengers, "passenger entered");
        Ok(())
    }

    /// A passenger alights at the current floor.
    pub fn leave(&self) {
        let mut state = self.state.lock();
        let floor = state.floor;
        if !state.stops.clear_one(floor) {
            tracing::warn!(car = self.id, floor, "passenger left without a pending stop");
        }
        match state.passengers.checked_sub(1) {
            Some(passengers) => state.passengers = passengers,
            None => tracing::warn!(car = self.id, floor, "passenger left an empty car"),
        }
        tracing::info!(car = self.id, floor, passengers = state.passengers, "passenger left");
    }

    pub fn add_listener(&self, listener: Arc<dyn StopListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn StopListener>) {
        self.listeners.remove(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl PartialEq for Car {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Car {}

impl Hash for Car {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Debug for Car {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Car")
            .field("id", &self.id)
            .field("passengers", &state.passengers)
            .field("direction", &state.direction)
            .field("floor", &state.floor)
            .field("num_floors", &self.num_floors)
            .field("timing", &self.timing)
            .field("running", &self.is_running())
            .finish()
    }
}
