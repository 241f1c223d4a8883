#![forbid(unsafe_code)]

pub mod state;
pub mod vm;

pub use state::{ViewError, ViewState};
pub use vm::{WorkoutIntent, WorkoutVm, start_workout};
