/// ----- PENDING STOPS -----
/// Per-floor counters of outstanding stop requests for one car. Counts
/// rather than flags: independent requests for the same floor accumulate and
/// are served one at a time. Callers are expected to pass floors inside
/// `0..num_floors`; the owning car validates them.

use shared_resources::direction::Direction;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PendingStops {
    stops: Vec<u32>,
    num_floors: u8,
}

impl PendingStops {
    pub fn new(num_floors: u8) -> Self {
        PendingStops {
            stops: vec![0; num_floors as usize],
            num_floors,
        }
    }

    pub fn num_floors(&self) -> u8 {
        self.num_floors
    }

    pub fn count(&self, floor: u8) -> u32 {
        self.stops[floor as usize]
    }

    pub fn has_stop(&self, floor: u8) -> bool {
        self.count(floor) > 0
    }

    pub fn total(&self) -> u32 {
        self.stops.iter().sum()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.stops
    }

    pub fn add_stop(&mut self, floor: u8) {
        self.stops[floor as usize] += 1;
    }

    /// Serves one request at `floor`. Returns false if there was nothing to
    /// serve, leaving the count at zero.
    pub fn clear_one(&mut self, floor: u8) -> bool {
        let count = &mut self.stops[floor as usize];
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Nearest floor with a stop at or above `from`.
    pub fn next_stop_up(&self, from: u8) -> Option<u8> {
        (from..self.num_floors).find(|&f| self.has_stop(f))
    }

    /// Nearest floor with a stop at or below `from`.
    pub fn next_stop_down(&self, from: u8) -> Option<u8> {
        (0..=from).rev().find(|&f| self.has_stop(f))
    }

    /// Farthest floor with a stop strictly beyond `from` in `direction`.
    pub fn farthest_stop_beyond(&self, from: u8, direction: Direction) -> Option<u8> {
        match direction {
            Direction::Up => ((from + 1)..self.num_floors).rev().find(|&f| self.has_stop(f)),
            Direction::Down => (0..from).find(|&f| self.has_stop(f)),
            Direction::Idle => None,
        }
    }

    pub fn further_stops_in_direction(&self, floor: u8, direction: Direction) -> bool {
        self.farthest_stop_beyond(floor, direction).is_some()
    }

    /// The floor a car at `floor` heading `direction` should go to next.
    /// An idle car takes the nearer candidate, the downward one on a tie.
    pub fn addressed_floor(&self, floor: u8, direction: Direction) -> u8 {
        let up = self.next_stop_up(floor);
        let down = self.next_stop_down(floor);
        let next = match direction {
            Direction::Up => up.or(down),
            Direction::Down => down.or(up),
            Direction::Idle => match (up, down) {
                (Some(up), Some(down)) => {
                    if up - floor < floor - down {
                        Some(up)
                    } else {
                        Some(down)
                    }
                }
                (up, down) => down.or(up),
            },
        };
        next.unwrap_or(floor)
    }

    /// Direction to keep after stopping at `floor`: carry on if there is more
    /// work ahead, turn around if there is work behind, otherwise go idle.
    pub fn next_direction(&self, floor: u8, last_direction: Direction) -> Direction {
        let preferred = match last_direction {
            Direction::Idle => Direction::Up,
            direction => direction,
        };
        if self.further_stops_in_direction(floor, preferred) {
            preferred
        } else if self.further_stops_in_direction(floor, preferred.opposite()) {
            preferred.opposite()
        } else {
            Direction::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops_at(num_floors: u8, floors: &[u8]) -> PendingStops {
        let mut stops = PendingStops::new(num_floors);
        for &floor in floors {
            stops.add_stop(floor);
        }
        stops
    }

    #[test]
    fn counts_accumulate_and_clear_individually() {
        let mut stops = stops_at(5, &[3, 3]);
        assert_eq!(stops.count(3), 2);
        assert!(stops.clear_one(3));
        assert_eq!(stops.count(3), 1);
        assert!(stops.clear_one(3));
        assert!(!stops.clear_one(3));
        assert_eq!(stops.count(3), 0);
        assert_eq!(stops.total(), 0);
    }

    #[test]
    fn scans_include_the_starting_floor() {
        let stops = stops_at(10, &[4]);
        assert_eq!(stops.next_stop_up(4), Some(4));
        assert_eq!(stops.next_stop_down(4), Some(4));
        assert_eq!(stops.next_stop_up(5), None);
        assert_eq!(stops.next_stop_down(3), None);
    }

    #[test]
    fn up_prefers_above_then_reverses() {
        let stops = stops_at(10, &[2, 7]);
        assert_eq!(stops.addressed_floor(5, Direction::Up), 7);
        assert_eq!(stops.addressed_floor(8, Direction::Up), 7);

        let below_only = stops_at(10, &[2]);
        assert_eq!(below_only.addressed_floor(5, Direction::Up), 2);
    }

    #[test]
    fn down_prefers_below_then_reverses() {
        let stops = stops_at(10, &[2, 7]);
        assert_eq!(stops.addressed_floor(5, Direction::Down), 2);

        let above_only = stops_at(10, &[7]);
        assert_eq!(above_only.addressed_floor(5, Direction::Down), 7);
    }

    #[test]
    fn idle_picks_nearest_and_breaks_ties_downward() {
        assert_eq!(stops_at(10, &[1, 6]).addressed_floor(5, Direction::Idle), 6);
        assert_eq!(stops_at(10, &[4, 8]).addressed_floor(5, Direction::Idle), 4);
        assert_eq!(stops_at(10, &[3, 7]).addressed_floor(5, Direction::Idle), 3);
        assert_eq!(stops_at(10, &[9]).addressed_floor(5, Direction::Idle), 9);
    }

    #[test]
    fn no_stops_addresses_current_floor() {
        let stops = PendingStops::new(10);
        for direction in [Direction::Up, Direction::Down, Direction::Idle] {
            assert_eq!(stops.addressed_floor(5, direction), 5);
        }
    }

    #[test]
    fn farthest_stop_beyond_is_strict() {
        let stops = stops_at(10, &[1, 3, 5, 8]);
        assert_eq!(stops.farthest_stop_beyond(5, Direction::Up), Some(8));
        assert_eq!(stops.farthest_stop_beyond(5, Direction::Down), Some(1));
        assert_eq!(stops.farthest_stop_beyond(8, Direction::Up), None);
        assert_eq!(stops.farthest_stop_beyond(5, Direction::Idle), None);
    }

    #[test]
    fn next_direction_continues_reverses_or_idles() {
        let stops = stops_at(10, &[2, 5, 7]);
        assert_eq!(stops.next_direction(5, Direction::Up), Direction::Up);
        assert_eq!(stops.next_direction(5, Direction::Down), Direction::Down);

        let behind = stops_at(10, &[2, 5]);
        assert_eq!(behind.next_direction(5, Direction::Up), Direction::Down);

        let only_here = stops_at(10, &[5]);
        assert_eq!(only_here.next_direction(5, Direction::Up), Direction::Idle);
        assert_eq!(only_here.next_direction(5, Direction::Idle), Direction::Idle);
    }
}
