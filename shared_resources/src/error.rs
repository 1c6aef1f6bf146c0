use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElevatorError {
    #[error("floor {floor} is outside the building (0..{num_floors})")]
    InvalidFloor { floor: u8, num_floors: u8 },

    #[error("dispatcher needs at least one car")]
    EmptyRoster,

    #[error("failed to spawn movement loop for car {car}: {source}")]
    Spawn {
        car: u8,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ElevatorError {
    pub fn config(message: impl Into<String>) -> Self {
        ElevatorError::Config { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, ElevatorError>;
