use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorkoutSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("completed exercises ({completed}) exceeds total ({total})")]
    CountMismatch { completed: u32, total: u32 },

    #[error("total volume must be a finite, non-negative number")]
    InvalidVolume,
}

/// Aggregate numbers shown on the workout-complete screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    exercises_completed: u32,
    total_exercises: u32,
    sets_completed: u32,
    total_volume: f64,
}

impl WorkoutSummary {
    /// # Errors
    ///
    /// Returns `WorkoutSummaryError` if the time range is inverted, the
    /// exercise counts disagree, or the volume is negative/non-finite.
    pub fn from_persisted(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        exercises_completed: u32,
        total_exercises: u32,
        sets_completed: u32,
        total_volume: f64,
    ) -> Result<Self, WorkoutSummaryError> {
        if completed_at < started_at {
            return Err(WorkoutSummaryError::InvalidTimeRange);
        }
        if exercises_completed > total_exercises {
            return Err(WorkoutSummaryError::CountMismatch {
                completed: exercises_completed,
                total: total_exercises,
            });
        }
        if !total_volume.is_finite() || total_volume < 0.0 {
            return Err(WorkoutSummaryError::InvalidVolume);
        }

        Ok(Self {
            started_at,
            completed_at,
            exercises_completed,
            total_exercises,
            sets_completed,
            total_volume,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn exercises_completed(&self) -> u32 {
        self.exercises_completed
    }

    #[must_use]
    pub fn total_exercises(&self) -> u32 {
        self.total_exercises
    }

    #[must_use]
    pub fn sets_completed(&self) -> u32 {
        self.sets_completed
    }

    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.completed_at - self.started_at).num_minutes()
    }
}
