//! Shared error types for the services crate.

use thiserror::Error;

use dreppy_core::model::{
    ExerciseError, ProfileValidationError, ProgramError, WorkoutError, WorkoutSummaryError,
};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the chat-completion client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    #[error("AI completions are not configured")]
    Disabled,
    #[error("AI request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `ChatService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error(transparent)]
    Ai(#[from] AiError),
}

/// Errors emitted by `WorkoutGenerator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("no exercises found")]
    EmptyCatalog,
    #[error("failed to parse AI response: {0}")]
    Parse(String),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the workout session controller and loop service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("the active exercise has no pending set")]
    NoPendingSet,
    #[error(transparent)]
    Workout(#[from] WorkoutError),
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error(transparent)]
    Summary(#[from] WorkoutSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgramService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgramServiceError {
    #[error("program name is required")]
    EmptyName,
    #[error("program needs at least one exercise")]
    NoExercises,
    #[error("exercise is not part of the draft")]
    UnknownExercise,
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("onboarding step is incomplete")]
    Incomplete,
    #[error(transparent)]
    Validation(#[from] ProfileValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
