use std::sync::Arc;

use dreppy_core::Clock;
use dreppy_core::model::{
    CatalogExercise, CatalogFilter, DEFAULT_REST_SECONDS, ExerciseId, Program, ProgramExercise,
    ProgramId, UserId,
};
use storage::repository::{ExerciseCatalogRepository, NewProgramRecord, ProgramRepository};
use tracing::info;

use crate::error::ProgramServiceError;
use crate::generator::GeneratedWorkout;

/// Shortest query the exercise picker searches for.
pub const MIN_SEARCH_CHARS: usize = 2;
/// Hits returned by the exercise picker.
pub const SEARCH_LIMIT: usize = 10;
/// Rows shown by the exercise library browser.
pub const LIBRARY_LIMIT: usize = 50;
/// Programs listed on the home screen.
pub const PROGRAM_LIST_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    /// Neighbour index of `index` in a list of `len`, if it exists.
    #[must_use]
    pub fn target(self, index: usize, len: usize) -> Option<usize> {
        let target = match self {
            MoveDirection::Up => index.checked_sub(1)?,
            MoveDirection::Down => index.checked_add(1)?,
        };
        (index < len && target < len).then_some(target)
    }
}

/// A program being assembled before it is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramDraft {
    name: String,
    exercises: Vec<ProgramExercise>,
}

impl ProgramDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-filled from generator output.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Program` if a generated target is invalid.
    pub fn from_generated(workout: &GeneratedWorkout) -> Result<Self, ProgramServiceError> {
        let mut draft = Self::new();
        draft.set_name(workout.name.clone());
        for exercise in &workout.exercises {
            let slot = exercise.to_program_exercise(DEFAULT_REST_SECONDS)?;
            if !draft.contains(slot.exercise_id()) {
                draft.exercises.push(slot);
            }
        }
        Ok(draft)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn exercises(&self) -> &[ProgramExercise] {
        &self.exercises
    }

    #[must_use]
    pub fn contains(&self, id: ExerciseId) -> bool {
        self.exercises.iter().any(|e| e.exercise_id() == id)
    }

    fn position(&self, id: ExerciseId) -> Result<usize, ProgramServiceError> {
        self.exercises
            .iter()
            .position(|e| e.exercise_id() == id)
            .ok_or(ProgramServiceError::UnknownExercise)
    }

    /// Append a catalog exercise with default targets; duplicates are ignored.
    pub fn add(&mut self, exercise: &CatalogExercise) -> bool {
        if self.contains(exercise.id) {
            return false;
        }
        self.exercises.push(ProgramExercise::from_catalog(exercise));
        true
    }

    pub fn remove(&mut self, id: ExerciseId) -> bool {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.exercise_id() != id);
        self.exercises.len() != before
    }

    /// # Errors
    ///
    /// Returns `ProgramServiceError` for an unknown exercise or zero sets.
    pub fn update_sets(&mut self, id: ExerciseId, sets: u32) -> Result<(), ProgramServiceError> {
        let index = self.position(id)?;
        self.exercises[index].set_target_sets(sets)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ProgramServiceError` for an unknown exercise or zero reps.
    pub fn update_reps(&mut self, id: ExerciseId, reps: u32) -> Result<(), ProgramServiceError> {
        let index = self.position(id)?;
        self.exercises[index].set_target_reps(reps)?;
        Ok(())
    }

    /// Swap the exercise at `index` with its neighbour; false when there is none.
    pub fn move_exercise(&mut self, index: usize, direction: MoveDirection) -> bool {
        match direction.target(index, self.exercises.len()) {
            Some(target) => {
                self.exercises.swap(index, target);
                true
            }
            None => false,
        }
    }

    /// Put `replacement` in place of `id`, keeping the original targets.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::UnknownExercise` if `id` is not drafted.
    pub fn replace(
        &mut self,
        id: ExerciseId,
        replacement: &ProgramExercise,
    ) -> Result<(), ProgramServiceError> {
        let index = self.position(id)?;
        let original = &self.exercises[index];
        let merged = ProgramExercise::new(
            replacement.exercise_id(),
            replacement.name(),
            replacement.muscle_group(),
            original.target_sets(),
            original.target_reps(),
            original.rest_seconds(),
        )?;
        self.exercises[index] = merged;
        Ok(())
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty() && !self.exercises.is_empty()
    }
}

/// Library browser filters; blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryQuery {
    pub search: String,
    pub body_part: Option<String>,
    pub equipment: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

#[derive(Clone)]
pub struct ProgramService {
    clock: Clock,
    programs: Arc<dyn ProgramRepository>,
    catalog: Arc<dyn ExerciseCatalogRepository>,
}

impl ProgramService {
    #[must_use]
    pub fn new(
        clock: Clock,
        programs: Arc<dyn ProgramRepository>,
        catalog: Arc<dyn ExerciseCatalogRepository>,
    ) -> Self {
        Self {
            clock,
            programs,
            catalog,
        }
    }

    /// Exercise picker search; queries shorter than two characters return nothing.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` on repository failures.
    pub async fn search_exercises(
        &self,
        query: &str,
    ) -> Result<Vec<CatalogExercise>, ProgramServiceError> {
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        let hits = self
            .catalog
            .search(&CatalogFilter {
                name_contains: Some(query.to_owned()),
                body_part: None,
                equipment: None,
                limit: SEARCH_LIMIT,
            })
            .await?;
        Ok(hits)
    }

    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` on repository failures.
    pub async fn browse_library(
        &self,
        query: &LibraryQuery,
    ) -> Result<Vec<CatalogExercise>, ProgramServiceError> {
        let hits = self
            .catalog
            .search(&CatalogFilter {
                name_contains: non_blank(Some(&query.search)),
                body_part: non_blank(query.body_part.as_deref()),
                equipment: non_blank(query.equipment.as_deref()),
                limit: LIBRARY_LIMIT,
            })
            .await?;
        Ok(hits)
    }

    /// Persist a draft for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::EmptyName` / `NoExercises` for an
    /// incomplete draft, or `Storage` if the insert fails.
    pub async fn save(
        &self,
        owner: UserId,
        draft: &ProgramDraft,
    ) -> Result<ProgramId, ProgramServiceError> {
        let name = draft.name().trim();
        if name.is_empty() {
            return Err(ProgramServiceError::EmptyName);
        }
        if draft.exercises().is_empty() {
            return Err(ProgramServiceError::NoExercises);
        }

        let id = self
            .programs
            .insert_program(NewProgramRecord {
                owner,
                name: name.to_owned(),
                exercises: draft.exercises().to_vec(),
                created_at: self.clock.now(),
            })
            .await?;
        info!(program = %id, owner = %owner, exercises = draft.exercises().len(), "program saved");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` on repository failures.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Program>, ProgramServiceError> {
        Ok(self.programs.list_programs(owner, PROGRAM_LIST_LIMIT).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` on repository failures.
    pub async fn get(&self, id: ProgramId) -> Result<Option<Program>, ProgramServiceError> {
        Ok(self.programs.get_program(id).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgramServiceError::Storage` (`NotFound` included) on failure.
    pub async fn delete(&self, owner: UserId, id: ProgramId) -> Result<(), ProgramServiceError> {
        self.programs.delete_program(owner, id).await?;
        info!(program = %id, owner = %owner, "program deleted");
        Ok(())
    }
}
