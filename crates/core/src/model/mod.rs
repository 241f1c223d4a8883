mod catalog;
mod exercise;
mod history;
mod ids;
mod profile;
mod program;
mod set;
mod summary;
mod workout;

pub use ids::{ExerciseId, ParseIdError, ProgramId, SessionId, UserId};

pub use catalog::{CatalogExercise, CatalogFilter, GENERAL_MUSCLE_GROUP};
pub use exercise::{ExerciseError, SetAdvance, WorkoutExercise};
pub use history::{
    personal_records_by_name, ExerciseHistory, PersonalRecord, SessionRecord, SessionStatus,
    SetPerformance,
};
pub use profile::{
    name_from_email, ExperienceLevel, FitnessGoal, Profile, ProfileValidationError,
    DEFAULT_TRAINING_DAYS, MAX_TRAINING_DAYS, MIN_TRAINING_DAYS,
};
pub use program::{
    Program, ProgramError, ProgramExercise, DEFAULT_REST_SECONDS, DEFAULT_TARGET_REPS,
    DEFAULT_TARGET_SETS,
};
pub use set::{SetDifficulty, SetError, WorkoutSet};
pub use summary::{WorkoutSummary, WorkoutSummaryError};
pub use workout::{total_volume, Workout, WorkoutError};
