/// ----- PASSENGER -----
/// A simulated passenger riding between an ordered list of floors. It waits
/// for the car it was assigned, boards when that car stops at its floor and
/// leaves when the car stops at its next floor.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use car::{Car, StopEvent, StopListener};
use shared_resources::direction::Direction;

#[derive(Debug, Default)]
struct PassengerState {
    // front is the floor the passenger is on (or boarded at)
    stops: VecDeque<u8>,
    in_elevator: bool,
    waiting: bool,
}

impl PassengerState {
    fn current_floor(&self) -> Option<u8> {
        self.stops.front().copied()
    }

    fn next_floor(&self) -> Option<u8> {
        self.stops.get(1).copied()
    }
}

#[derive(Debug)]
pub struct Passenger {
    id: u32,
    state: Mutex<PassengerState>,
}

impl Passenger {
    pub fn new(id: u32) -> Self {
        Passenger {
            id,
            state: Mutex::new(PassengerState::default()),
        }
    }

    pub fn with_trip(id: u32, stops: impl IntoIterator<Item = u8>) -> Self {
        let passenger = Passenger::new(id);
        for floor in stops {
            passenger.add_stop(floor);
        }
        passenger
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_in_elevator(&self) -> bool {
        self.state.lock().in_elevator
    }

    pub fn is_waiting(&self) -> bool {
        self.state.lock().waiting
    }

    /// Floor the passenger is on, if it has not left the building.
    pub fn current_floor(&self) -> Option<u8> {
        self.state.lock().current_floor()
    }

    pub fn next_floor(&self) -> Option<u8> {
        self.state.lock().next_floor()
    }

    /// Direction of the next leg of the trip, if there is one.
    pub fn requested_direction(&self) -> Option<Direction> {
        let state = self.state.lock();
        Some(Direction::between(state.current_floor()?, state.next_floor()?))
    }

    pub fn add_stop(&self, floor: u8) {
        self.state.lock().stops.push_back(floor);
    }

    pub fn assign_elevator(self: &Arc<Self>, car: &Car) {
        self.state.lock().waiting = true;
        car.add_listener(Arc::clone(self) as Arc<dyn StopListener>);
    }
}

impl StopListener for Passenger {
    fn on_stop_event(&self, event: &StopEvent<'_>) -> bool {
        let car = event.car();
        let floor = event.floor();
        let mut state = self.state.lock();

        if state.in_elevator && Some(floor) == state.next_floor() {
            state.stops.pop_front();
            state.in_elevator = false;
            state.waiting = false;
            car.leave();
            tracing::info!(passenger = self.id, car = car.id(), floor, "passenger leaves elevator");
            return true;
        }

        if !state.in_elevator && Some(floor) == state.current_floor() {
            state.waiting = false;
            let Some(next_floor) = state.next_floor() else {
                state.stops.pop_front();
                return true;
            };
            if let Err(e) = car.enter(next_floor) {
                tracing::warn!(passenger = self.id, car = car.id(), "could not board: {}", e);
                return true;
            }
            state.in_elevator = true;
            tracing::info!(passenger = self.id, car = car.id(), floor, to_floor = next_floor, "passenger enters elevator");
            return false;
        }

        if state.in_elevator {
            tracing::debug!(passenger = self.id, car = car.id(), floor, "passenger is in elevator");
        } else if let Some(current) = state.current_floor() {
            let activity = if state.waiting { "waiting" } else { "hanging around" };
            tracing::debug!(passenger = self.id, floor = current, "passenger is {}", activity);
        } else {
            tracing::debug!(passenger = self.id, "passenger has left the building");
        }
        false
    }
}
