mod controller;
mod progress;
mod queries;
mod workflow;

// Public API of the workout session subsystem.
pub use crate::error::SessionError;
pub use controller::{
    Advance, CompletedSet, RequestTag, SkipOutcome, TipContext, WorkoutController,
};
pub use progress::SessionProgress;
pub use workflow::{ActiveSession, NoWorkoutReason, SessionStart, WorkoutLoopService};
