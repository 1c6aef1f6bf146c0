pub mod car;
pub mod estimator;
pub mod listener;
pub mod movement;
pub mod requests;
pub mod status;

pub use car::{Car, CarId};
pub use listener::{StopEvent, StopListener};
pub use status::CarStatus;
