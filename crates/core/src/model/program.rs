use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::catalog::CatalogExercise;
use crate::model::ids::{ExerciseId, ProgramId, UserId};

pub const DEFAULT_TARGET_SETS: u32 = 3;
pub const DEFAULT_TARGET_REPS: u32 = 10;
pub const DEFAULT_REST_SECONDS: u32 = 120;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgramError {
    #[error("program name cannot be empty")]
    EmptyName,

    #[error("exercise name cannot be empty")]
    EmptyExerciseName,

    #[error("target sets must be > 0")]
    InvalidTargetSets,

    #[error("target reps must be > 0")]
    InvalidTargetReps,
}

//
// ─── PROGRAM EXERCISE ──────────────────────────────────────────────────────────
//

/// One ordered slot in a program template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramExercise {
    exercise_id: ExerciseId,
    name: String,
    muscle_group: String,
    target_sets: u32,
    target_reps: u32,
    rest_seconds: u32,
}

impl ProgramExercise {
    /// # Errors
    ///
    /// Returns `ProgramError` if the name is blank or sets/reps are zero.
    pub fn new(
        exercise_id: ExerciseId,
        name: impl Into<String>,
        muscle_group: impl Into<String>,
        target_sets: u32,
        target_reps: u32,
        rest_seconds: u32,
    ) -> Result<Self, ProgramError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProgramError::EmptyExerciseName);
        }
        if target_sets == 0 {
            return Err(ProgramError::InvalidTargetSets);
        }
        if target_reps == 0 {
            return Err(ProgramError::InvalidTargetReps);
        }

        Ok(Self {
            exercise_id,
            name: name.trim().to_owned(),
            muscle_group: muscle_group.into(),
            target_sets,
            target_reps,
            rest_seconds,
        })
    }

    /// Slot for a catalog entry with 3 sets of 10 and 120 s rest.
    #[must_use]
    pub fn from_catalog(exercise: &CatalogExercise) -> Self {
        Self {
            exercise_id: exercise.id,
            name: exercise.name.trim().to_owned(),
            muscle_group: exercise.muscle_group().to_owned(),
            target_sets: DEFAULT_TARGET_SETS,
            target_reps: DEFAULT_TARGET_REPS,
            rest_seconds: DEFAULT_REST_SECONDS,
        }
    }

    #[must_use]
    pub fn exercise_id(&self) -> ExerciseId {
        self.exercise_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn muscle_group(&self) -> &str {
        &self.muscle_group
    }

    #[must_use]
    pub fn target_sets(&self) -> u32 {
        self.target_sets
    }

    #[must_use]
    pub fn target_reps(&self) -> u32 {
        self.target_reps
    }

    #[must_use]
    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    /// # Errors
    ///
    /// Returns `ProgramError::InvalidTargetSets` for zero.
    pub fn set_target_sets(&mut self, sets: u32) -> Result<(), ProgramError> {
        if sets == 0 {
            return Err(ProgramError::InvalidTargetSets);
        }
        self.target_sets = sets;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ProgramError::InvalidTargetReps` for zero.
    pub fn set_target_reps(&mut self, reps: u32) -> Result<(), ProgramError> {
        if reps == 0 {
            return Err(ProgramError::InvalidTargetReps);
        }
        self.target_reps = reps;
        Ok(())
    }
}

//
// ─── PROGRAM ───────────────────────────────────────────────────────────────────
//

/// A saved workout template owned by a user.
///
/// A program may be stored without exercises; starting a session from such a
/// program yields no workout rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    id: ProgramId,
    owner: UserId,
    name: String,
    exercises: Vec<ProgramExercise>,
    updated_at: DateTime<Utc>,
}

impl Program {
    /// # Errors
    ///
    /// Returns `ProgramError::EmptyName` if name is empty or whitespace-only.
    pub fn new(
        id: ProgramId,
        owner: UserId,
        name: impl Into<String>,
        exercises: Vec<ProgramExercise>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ProgramError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProgramError::EmptyName);
        }

        Ok(Self {
            id,
            owner,
            name: name.trim().to_owned(),
            exercises,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn exercises(&self) -> &[ProgramExercise] {
        &self.exercises
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn program_rejects_blank_name() {
        let err = Program::new(ProgramId::new(1), UserId::new(1), "  ", vec![], fixed_now())
            .unwrap_err();
        assert_eq!(err, ProgramError::EmptyName);
    }

    #[test]
    fn program_trims_name_and_allows_no_exercises() {
        let program =
            Program::new(ProgramId::new(1), UserId::new(1), " Push ", vec![], fixed_now()).unwrap();
        assert_eq!(program.name(), "Push");
        assert!(program.is_empty());
    }

    #[test]
    fn catalog_slot_uses_defaults() {
        let catalog = CatalogExercise {
            id: ExerciseId::new(4),
            name: "Squat".into(),
            equipment: None,
            body_part: None,
            target_muscle: Some("Quads".into()),
            rating: 1.0,
        };
        let slot = ProgramExercise::from_catalog(&catalog);
        assert_eq!(slot.target_sets(), 3);
        assert_eq!(slot.target_reps(), 10);
        assert_eq!(slot.rest_seconds(), 120);
        assert_eq!(slot.muscle_group(), "Quads");
    }

    #[test]
    fn zero_sets_are_rejected_without_mutation() {
        let mut slot =
            ProgramExercise::new(ExerciseId::new(1), "Row", "Back", 4, 8, 90).unwrap();
        assert_eq!(
            slot.set_target_sets(0).unwrap_err(),
            ProgramError::InvalidTargetSets
        );
        assert_eq!(slot.target_sets(), 4);
    }
}
