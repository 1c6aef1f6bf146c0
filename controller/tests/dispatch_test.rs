use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use car::{Car, StopEvent, StopListener};
use controller::{Dispatcher, Passenger};
use shared_resources::direction::Direction;

fn car(id: u8, floor: u8, speed_ms: u64, dwell_ms: u64) -> Car {
    Car::new(id, Direction::Idle, floor, 10, Duration::from_millis(speed_ms), Duration::from_millis(dwell_ms)).unwrap()
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn single_idle_car_scenario() {
    let dispatcher = Dispatcher::new(vec![car(0, 0, 100, 200)], Duration::from_secs(5)).unwrap();
    let only = &dispatcher.elevators()[0];

    assert_eq!(only.calculate_time_to_floor(5, Direction::Up).unwrap(), Duration::from_millis(700));

    let chosen = dispatcher.request_elevator(5, Direction::Up).unwrap();
    assert_eq!(chosen.id(), 0);
    assert_eq!(chosen.pending_stops_at(5).unwrap(), 1);

    dispatcher.stop();
}

#[test]
fn fewer_passengers_wins_between_equidistant_idle_cars() {
    let loaded = car(0, 2, 10, 10);
    loaded.move_elevator(2).unwrap();
    loaded.enter(2).unwrap();
    loaded.enter(2).unwrap();
    let light = car(1, 2, 10, 10);
    light.move_elevator(2).unwrap();
    light.move_elevator(2).unwrap();
    light.enter(2).unwrap();

    let dispatcher = Dispatcher::new(vec![loaded, light], Duration::from_secs(5)).unwrap();
    let chosen = dispatcher.request_elevator(6, Direction::Up).unwrap();

    assert_eq!(chosen.id(), 1);
    dispatcher.stop();
}

struct ArrivalCounter {
    floor: u8,
    arrivals: AtomicUsize,
}

impl StopListener for ArrivalCounter {
    fn on_stop_event(&self, event: &StopEvent<'_>) -> bool {
        if event.floor() == self.floor {
            self.arrivals.fetch_add(1, Ordering::SeqCst);
            event.car().leave();
            return true;
        }
        false
    }
}

#[test]
fn listener_hears_the_arrival_and_unregisters() {
    let dispatcher = Dispatcher::new(vec![car(0, 0, 2, 2)], Duration::from_secs(5)).unwrap();
    let chosen = dispatcher.request_elevator(3, Direction::Up).unwrap();
    let counter = Arc::new(ArrivalCounter { floor: 3, arrivals: AtomicUsize::new(0) });
    chosen.add_listener(counter.clone());

    assert!(wait_until(Duration::from_secs(5), || counter.arrivals.load(Ordering::SeqCst) == 1));
    assert!(wait_until(Duration::from_secs(5), || chosen.listener_count() == 0));
    assert_eq!(chosen.pending_stops_at(3).unwrap(), 0);
    assert_eq!(chosen.current_floor(), 3);

    dispatcher.stop();
}

#[test]
fn passenger_round_trip_through_the_dispatcher() {
    let dispatcher = Dispatcher::new(vec![car(0, 0, 2, 2), car(1, 9, 2, 2)], Duration::from_secs(5)).unwrap();
    let passenger = Arc::new(Passenger::with_trip(0, [0, 6]));

    let chosen = dispatcher.request_elevator(0, Direction::Up).unwrap();
    assert_eq!(chosen.id(), 0);
    passenger.assign_elevator(&chosen);

    assert!(wait_until(Duration::from_secs(5), || {
        !passenger.is_waiting() && !passenger.is_in_elevator() && passenger.current_floor() == Some(6)
    }));
    assert_eq!(chosen.passenger_count(), 0);
    assert_eq!(chosen.pending_stops_at(0).unwrap(), 0);
    assert_eq!(chosen.pending_stops_at(6).unwrap(), 0);

    let report = dispatcher.stop();
    assert!(report.is_clean());
}

struct Stubborn;

impl StopListener for Stubborn {
    fn on_stop_event(&self, _event: &StopEvent<'_>) -> bool {
        thread::sleep(Duration::from_millis(500));
        false
    }
}

#[test]
fn shutdown_reports_loops_that_overrun_the_timeout() {
    let dispatcher = Dispatcher::new(vec![car(0, 0, 1, 1)], Duration::from_millis(50)).unwrap();
    let chosen = dispatcher.request_elevator(0, Direction::Up).unwrap();
    chosen.add_listener(Arc::new(Stubborn));

    // let the loop get stuck inside the slow listener
    thread::sleep(Duration::from_millis(100));
    let report = dispatcher.stop();

    assert_eq!(report.cancelled, vec![0]);
    assert!(report.stopped.is_empty());
    assert!(!chosen.is_running());
}

struct SlowFirstStop {
    calls: AtomicUsize,
    finished_slow_call: AtomicBool,
}

impl StopListener for SlowFirstStop {
    fn on_stop_event(&self, _event: &StopEvent<'_>) -> bool {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            thread::sleep(Duration::from_millis(600));
            self.finished_slow_call.store(true, Ordering::SeqCst);
        }
        false
    }
}

#[test]
fn shutdown_waits_for_the_loop_of_a_released_and_restarted_car() {
    let dispatcher = Dispatcher::new(vec![car(0, 0, 1, 1)], Duration::from_millis(50)).unwrap();
    let first = dispatcher.request_elevator(0, Direction::Up).unwrap();
    let listener = Arc::new(SlowFirstStop { calls: AtomicUsize::new(0), finished_slow_call: AtomicBool::new(false) });
    first.add_listener(listener.clone());

    // the first loop is now stuck in the slow call
    thread::sleep(Duration::from_millis(100));
    dispatcher.release_elevator(&first);
    let again = dispatcher.request_elevator(3, Direction::Up).unwrap();
    assert!(again.is_running());

    let report = dispatcher.stop();

    assert!(!listener.finished_slow_call.load(Ordering::SeqCst));
    assert_eq!(report.cancelled, vec![0]);
    assert!(!report.is_clean());
}

#[test]
fn stop_leaves_every_car_halted_but_keeps_their_state() {
    let dispatcher = Dispatcher::new(vec![car(0, 0, 50, 50), car(1, 9, 50, 50)], Duration::from_secs(5)).unwrap();
    dispatcher.request_elevator(4, Direction::Up).unwrap();
    dispatcher.request_elevator(7, Direction::Down).unwrap();

    let report = dispatcher.stop();

    assert!(report.is_clean());
    for car in dispatcher.elevators() {
        assert!(!car.is_running());
    }
    let owed: u32 = dispatcher.elevators().iter().map(|car| car.status().total_pending_stops()).sum();
    assert_eq!(owed, 2);
}
