pub mod debug;
pub mod dispatcher;
pub mod passenger;
pub mod simulation;

pub use dispatcher::{Dispatcher, ShutdownReport};
pub use passenger::Passenger;
