/// ----- ARRIVAL-TIME ESTIMATOR -----
/// Projects how long a car, following its current trajectory, needs before
/// it can serve a new request. Works on a copy of the pending stops so a stop
/// charged on the way out is not charged again on the way back.

use std::time::Duration;

use shared_resources::direction::Direction;

use crate::requests::PendingStops;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub speed_per_floor: Duration,
    pub avg_dwell_per_stop: Duration,
}

pub fn time_to_floor(
    stops: &PendingStops,
    timing: Timing,
    current_floor: u8,
    car_direction: Direction,
    to_floor: u8,
    requested_direction: Direction,
) -> Duration {
    let mut working = stops.clone();
    let mut total = Duration::ZERO;

    // the dwell needed to actually stop at a floor nobody asked for yet
    if stops.count(to_floor) == 0 {
        total += timing.avg_dwell_per_stop;
    }
    if working.clear_one(current_floor) {
        total += timing.avg_dwell_per_stop;
    }

    let heading = match car_direction {
        Direction::Idle => Direction::between(current_floor, to_floor),
        direction => direction,
    };
    let ahead = match heading {
        Direction::Up => to_floor >= current_floor,
        Direction::Down => to_floor <= current_floor,
        Direction::Idle => true,
    };
    let same_way = requested_direction == heading || requested_direction == Direction::Idle;

    if car_direction == Direction::Idle || (ahead && same_way) {
        return total + leg(&mut working, timing, current_floor, to_floor);
    }

    let turn = turning_point(stops, current_floor, heading, to_floor, ahead);
    total += leg(&mut working, timing, current_floor, turn);
    total + leg(&mut working, timing, turn, to_floor)
}

/// Where a car heading `heading` reverses: the farthest pending stop ahead,
/// or the requested floor itself if that lies even farther out.
fn turning_point(stops: &PendingStops, current_floor: u8, heading: Direction, to_floor: u8, ahead: bool) -> u8 {
    let farthest = stops
        .farthest_stop_beyond(current_floor, heading)
        .unwrap_or(current_floor);
    if !ahead {
        return farthest;
    }
    match heading {
        Direction::Up => farthest.max(to_floor),
        Direction::Down => farthest.min(to_floor),
        Direction::Idle => to_floor,
    }
}

/// Travel from `from` to `to`, paying per floor and per served stop on the
/// floors entered along the way.
fn leg(working: &mut PendingStops, timing: Timing, from: u8, to: u8) -> Duration {
    let floors: Box<dyn Iterator<Item = u8>> = if to >= from {
        Box::new((from + 1)..=to)
    } else {
        Box::new((to..from).rev())
    };

    let mut time = Duration::ZERO;
    for floor in floors {
        time += timing.speed_per_floor;
        if working.clear_one(floor) {
            time += timing.avg_dwell_per_stop;
        }
    }
    time
}
