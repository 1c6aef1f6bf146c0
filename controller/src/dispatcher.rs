/// ----- DISPATCHER -----
/// Owns the roster of cars, routes each floor request to the car estimated
/// to get there first and runs one movement thread per started car.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

use car::movement;
use car::{Car, CarId};
use shared_resources::config::ElevatorConfig;
use shared_resources::direction::Direction;
use shared_resources::error::{ElevatorError, Result};

struct MovementTask {
    handle: JoinHandle<()>,
    // dropping the sender interrupts the loop's current wait
    cancel_tx: Option<Sender<()>>,
    // disconnects when the thread exits
    done_rx: Receiver<()>,
}

impl MovementTask {
    fn cancel(&mut self) {
        self.cancel_tx.take();
    }

    fn is_finished(&self) -> bool {
        matches!(self.done_rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    fn join(self, id: CarId) {
        if self.handle.join().is_err() {
            tracing::warn!(car = id, "movement loop panicked");
        }
    }
}

#[derive(Default)]
struct TaskTable {
    active: HashMap<CarId, MovementTask>,
    // cancelled loops of released cars, possibly still inside a listener
    retiring: Vec<(CarId, MovementTask)>,
}

impl TaskTable {
    fn retire(&mut self, id: CarId) {
        if let Some(mut task) = self.active.remove(&id) {
            task.cancel();
            self.retiring.push((id, task));
        }
        self.reap();
    }

    /// Joins retired loops that have already exited.
    fn reap(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.retiring.drain(..).partition(|(_, task)| task.is_finished());
        self.retiring = running;
        for (id, task) in finished {
            task.join(id);
        }
    }

    fn drain_all(&mut self) -> Vec<(CarId, MovementTask)> {
        let mut tasks: Vec<(CarId, MovementTask)> = self.active.drain().collect();
        tasks.append(&mut self.retiring);
        tasks.sort_by_key(|(id, _)| *id);
        tasks
    }
}

/// Outcome of `Dispatcher::stop`.
#[derive(serde::Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// One entry per movement loop that finished within the timeout.
    pub stopped: Vec<CarId>,
    /// One entry per movement loop that was still busy and got detached.
    /// A restarted car may show up here for its earlier loop and in
    /// `stopped` for its current one.
    pub cancelled: Vec<CarId>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.cancelled.is_empty()
    }
}

pub struct Dispatcher {
    elevators: Vec<Arc<Car>>,
    // held for the whole select-and-commit of a request
    tasks: Mutex<TaskTable>,
    shutdown_timeout: Duration,
}

impl Dispatcher {
    pub fn new(elevators: Vec<Car>, shutdown_timeout: Duration) -> Result<Self> {
        if elevators.is_empty() {
            return Err(ElevatorError::EmptyRoster);
        }
        Ok(Dispatcher {
            elevators: elevators.into_iter().map(Arc::new).collect(),
            tasks: Mutex::new(TaskTable::default()),
            shutdown_timeout,
        })
    }

    /// Builds the roster described by `config`: every car idle at floor 0.
    pub fn from_config(config: &ElevatorConfig) -> Result<Self> {
        let elevators = (0..config.num_elevators)
            .map(|id| {
                Car::new(
                    id,
                    Direction::Idle,
                    0,
                    config.num_floors,
                    config.speed_between_floors(),
                    config.avg_waiting_time_per_stop(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(elevators, config.shutdown_timeout())
    }

    pub fn elevators(&self) -> &[Arc<Car>] {
        &self.elevators
    }

    /// Picks the car with the lowest estimated time to `to_floor`, preferring
    /// fewer passengers and then roster order on ties, starts it if needed
    /// and commits the stop. The caller may register a listener on the
    /// returned car.
    pub fn request_elevator(&self, to_floor: u8, direction: Direction) -> Result<Arc<Car>> {
        let mut tasks = self.tasks.lock();

        let mut fastest: Option<(&Arc<Car>, Duration, u32)> = None;
        for car in &self.elevators {
            let time = car.calculate_time_to_floor(to_floor, direction)?;
            let passengers = car.passenger_count();
            let better = match fastest {
                None => true,
                Some((_, best_time, best_passengers)) => {
                    time < best_time || (time == best_time && passengers < best_passengers)
                }
            };
            if better {
                fastest = Some((car, time, passengers));
            }
        }
        let (car, time, _) = fastest.ok_or(ElevatorError::EmptyRoster)?;

        if !car.is_running() {
            Self::start_elevator(&mut tasks, car)?;
        }
        car.move_elevator(to_floor)?;

        tracing::info!(
            car = car.id(),
            floor = to_floor,
            %direction,
            estimate_ms = time.as_millis() as u64,
            "elevator requested"
        );
        Ok(Arc::clone(car))
    }

    fn start_elevator(tasks: &mut TaskTable, car: &Arc<Car>) -> Result<()> {
        car.start();
        // a loop from an earlier run may still be finishing its last step
        tasks.retire(car.id());

        let (cancel_tx, cancel_rx) = unbounded::<()>();
        let (done_tx, done_rx) = unbounded::<()>();
        let loop_car = Arc::clone(car);
        let handle = thread::Builder::new()
            .name(format!("car-{}", car.id()))
            .spawn(move || {
                let _done_tx = done_tx;
                movement::run(&loop_car, &cancel_rx);
            })
            .map_err(|source| {
                car.stop();
                ElevatorError::Spawn { car: car.id(), source }
            })?;

        tasks.active.insert(
            car.id(),
            MovementTask {
                handle,
                cancel_tx: Some(cancel_tx),
                done_rx,
            },
        );
        Ok(())
    }

    /// Stops a single car. Its movement loop returns at its next wait and is
    /// still waited for by `stop`.
    pub fn release_elevator(&self, car: &Car) {
        car.stop();
        self.tasks.lock().retire(car.id());
        tracing::info!(car = car.id(), "elevator released");
    }

    /// Stops every car and waits up to the shutdown timeout for their
    /// movement loops. Loops still running after that are detached and
    /// listed in the report.
    pub fn stop(&self) -> ShutdownReport {
        let mut tasks = self.tasks.lock();
        for car in &self.elevators {
            car.stop();
        }

        let mut pending = tasks.drain_all();
        tracing::info!("attempt to shut down {} movement loops", pending.len());
        for (_, task) in pending.iter_mut() {
            task.cancel();
        }

        let deadline = Instant::now() + self.shutdown_timeout;
        let mut report = ShutdownReport::default();
        for (id, task) in pending {
            match task.done_rx.recv_deadline(deadline) {
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(car = id, "cancel non-finished movement loop");
                    report.cancelled.push(id);
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    task.join(id);
                    report.stopped.push(id);
                }
            }
        }

        tracing::info!(stopped = ?report.stopped, cancelled = ?report.cancelled, "shutdown finished");
        report
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        for car in &self.elevators {
            car.stop();
        }
        for (_, task) in self.tasks.get_mut().drain_all().iter_mut() {
            task.cancel();
        }
    }
}
