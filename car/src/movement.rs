/// ----- MOVEMENT LOOP -----
/// Drives one car while it is running: resolve the addressed floor, take one
/// step, wait for the travel time and, after an arrival, for the dwell time.
/// Waits end early when the cancel channel fires or disconnects.

use std::time::Duration;

use crossbeam_channel::{select, Receiver};

use crate::car::Car;

/// Why a movement loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Stopped,
    Cancelled,
}

pub fn run(car: &Car, cancel_rx: &Receiver<()>) -> LoopExit {
    tracing::info!(car = car.id(), floor = car.current_floor(), "movement loop started");

    let exit = loop {
        if !car.is_running() {
            break LoopExit::Stopped;
        }

        let addressed_floor = car.addressed_floor();
        let floor = car.move_to_next_floor();

        if !wait(cancel_rx, car.speed_per_floor()) {
            break LoopExit::Cancelled;
        }
        if floor == addressed_floor && !wait(cancel_rx, car.avg_dwell_per_stop()) {
            break LoopExit::Cancelled;
        }
    };

    tracing::info!(car = car.id(), floor = car.current_floor(), ?exit, "movement loop finished");
    exit
}

/// Sleeps for `duration` unless cancelled first. Returns false on cancel.
fn wait(cancel_rx: &Receiver<()>, duration: Duration) -> bool {
    select! {
        recv(cancel_rx) -> _ => false,
        default(duration) => true,
    }
}
