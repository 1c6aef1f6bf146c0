use shared_resources::direction::Direction;

use crate::car::CarId;

/// Point-in-time copy of a car's state, taken under the car lock.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CarStatus {
    pub id: CarId,
    pub floor: u8,
    pub direction: Direction,
    pub addressed_floor: u8,
    pub passengers: u32,
    pub running: bool,
    pub pending_stops: Vec<u32>,
}

impl CarStatus {
    pub fn total_pending_stops(&self) -> u32 {
        self.pending_stops.iter().sum()
    }

    pub fn as_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_json() {
        let status = CarStatus {
            id: 2,
            floor: 3,
            direction: Direction::Up,
            addressed_floor: 5,
            passengers: 1,
            running: true,
            pending_stops: vec![0, 0, 0, 0, 0, 2],
        };

        let json = status.as_json().unwrap();

        assert_eq!(status.total_pending_stops(), 2);
        assert!(json.contains("\"direction\":\"Up\""));
        assert_eq!(serde_json::from_str::<CarStatus>(&json).unwrap(), status);
    }
}
