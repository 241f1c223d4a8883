#![forbid(unsafe_code)]

pub mod ai;
pub mod app_services;
pub mod chat;
pub mod coaching;
pub mod error;
pub mod generator;
pub mod history_service;
pub mod profile_service;
pub mod program_service;
pub mod sessions;

pub use dreppy_core::Clock;

pub use app_services::AppServices;
pub use chat::{ChatService, ExerciseContext};
pub use coaching::{CoachingService, TipRequest};
pub use error::{
    AiError, AppServicesError, ChatError, GenerationError, ProfileError, ProgramServiceError,
    SessionError,
};
pub use generator::{GeneratedWorkout, GuidedRequest, WorkoutGenerator};
pub use history_service::{HistoryService, HistoryStats};
pub use profile_service::{OnboardingDraft, OnboardingStep, ProfileService};
pub use program_service::{LibraryQuery, MoveDirection, ProgramDraft, ProgramService};
pub use sessions::{ActiveSession, SessionStart, WorkoutController, WorkoutLoopService};
