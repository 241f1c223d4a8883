use thiserror::Error;

use crate::model::ids::ExerciseId;
use crate::model::program::ProgramExercise;
use crate::model::set::{SetDifficulty, SetError, WorkoutSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise has no sets")]
    NoSets,

    #[error("no pending set: set {current_set} is already completed")]
    NoPendingSet { current_set: u32 },

    #[error("cannot substitute after sets were completed")]
    AlreadyStarted,

    #[error(transparent)]
    Set(#[from] SetError),
}

/// Where the set pointer ended up after completing or skipping a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetAdvance {
    /// `current_set` moved to the next set of the same exercise.
    NextSet,
    /// The pointer was already on the last set and stays there.
    LastSet,
}

/// An exercise as executed within one session.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    id: ExerciseId,
    name: String,
    muscle_group: String,
    rest_seconds: u32,
    notes: Option<String>,
    sets: Vec<WorkoutSet>,
    current_set: u32,
}

impl WorkoutExercise {
    /// Build the session copy of a program slot with every set pre-filled
    /// with `starting_weight` and the slot's target reps.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::Set` if the starting weight is invalid.
    pub fn from_program(slot: &ProgramExercise, starting_weight: f64) -> Result<Self, ExerciseError> {
        let sets = (1..=slot.target_sets())
            .map(|n| WorkoutSet::planned(n, slot.target_reps(), starting_weight))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(
            slot.exercise_id(),
            slot.name(),
            slot.muscle_group(),
            slot.rest_seconds(),
            None,
            sets,
        )
    }

    /// # Errors
    ///
    /// Returns `ExerciseError::NoSets` for an empty set list.
    pub fn new(
        id: ExerciseId,
        name: impl Into<String>,
        muscle_group: impl Into<String>,
        rest_seconds: u32,
        notes: Option<String>,
        sets: Vec<WorkoutSet>,
    ) -> Result<Self, ExerciseError> {
        if sets.is_empty() {
            return Err(ExerciseError::NoSets);
        }
        Ok(Self {
            id,
            name: name.into(),
            muscle_group: muscle_group.into(),
            rest_seconds,
            notes,
            sets,
            current_set: 1,
        })
    }

    #[must_use]
    pub fn id(&self) -> ExerciseId {
        self.id
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
    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub fn sets(&self) -> &[WorkoutSet] {
        &self.sets
    }

    /// 1-based pointer to the set being worked on.
    #[must_use]
    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        u32::try_from(self.sets.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn current(&self) -> Option<&WorkoutSet> {
        let index = usize::try_from(self.current_set).ok()?.checked_sub(1)?;
        self.sets.get(index)
    }

    fn current_mut(&mut self) -> Option<&mut WorkoutSet> {
        let index = usize::try_from(self.current_set).ok()?.checked_sub(1)?;
        self.sets.get_mut(index)
    }

    /// True iff every set is completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sets.iter().all(WorkoutSet::is_completed)
    }

    #[must_use]
    pub fn has_pending_set(&self) -> bool {
        self.current().is_some_and(|s| !s.is_completed())
    }

    #[must_use]
    pub fn is_on_last_set(&self) -> bool {
        self.current_set >= self.total_sets()
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.is_completed()).count()
    }

    /// Complete the current set and move the pointer forward if another set
    /// follows.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::NoPendingSet` when the current set is already
    /// completed; nothing changes in that case.
    pub fn complete_current(
        &mut self,
        reps: u32,
        weight: f64,
        difficulty: SetDifficulty,
    ) -> Result<SetAdvance, ExerciseError> {
        let current_set = self.current_set;
        let set = self
            .current_mut()
            .filter(|s| !s.is_completed())
            .ok_or(ExerciseError::NoPendingSet { current_set })?;
        set.complete(reps, weight, difficulty)?;
        Ok(self.advance())
    }

    /// Move past the current set without completing it.
    pub fn skip_current(&mut self) -> SetAdvance {
        self.advance()
    }

    fn advance(&mut self) -> SetAdvance {
        if self.is_on_last_set() {
            SetAdvance::LastSet
        } else {
            self.current_set += 1;
            SetAdvance::NextSet
        }
    }

    /// Swap in a different exercise while keeping the planned sets.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::AlreadyStarted` once any set is completed.
    pub fn substitute(
        &mut self,
        id: ExerciseId,
        name: impl Into<String>,
        muscle_group: impl Into<String>,
    ) -> Result<(), ExerciseError> {
        if self.completed_sets() > 0 {
            return Err(ExerciseError::AlreadyStarted);
        }
        self.id = id;
        self.name = name.into();
        self.muscle_group = muscle_group.into();
        Ok(())
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(WorkoutSet::volume).sum()
    }
}
