use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::exercise::{ExerciseError, WorkoutExercise};
use crate::model::ids::ProgramId;
use crate::model::program::{Program, ProgramExercise};
use crate::model::summary::{WorkoutSummary, WorkoutSummaryError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorkoutError {
    #[error("workout has no exercises")]
    Empty,

    #[error("exercise index {index} out of range")]
    IndexOutOfRange { index: usize },

    #[error(transparent)]
    Exercise(#[from] ExerciseError),
}

/// The in-memory state of one workout being performed.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    program_id: ProgramId,
    name: String,
    started_at: DateTime<Utc>,
    exercises: Vec<WorkoutExercise>,
}

impl Workout {
    /// # Errors
    ///
    /// Returns `WorkoutError::Empty` when `exercises` is empty.
    pub fn new(
        program_id: ProgramId,
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<Self, WorkoutError> {
        if exercises.is_empty() {
            return Err(WorkoutError::Empty);
        }
        Ok(Self {
            program_id,
            name: name.into(),
            started_at,
            exercises,
        })
    }

    /// Build a workout from a program, asking `starting_weight` for the
    /// pre-fill weight of each exercise.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutError::Empty` for a program without exercises.
    pub fn from_program(
        program: &Program,
        started_at: DateTime<Utc>,
        mut starting_weight: impl FnMut(&ProgramExercise) -> f64,
    ) -> Result<Self, WorkoutError> {
        let exercises = program
            .exercises()
            .iter()
            .map(|slot| WorkoutExercise::from_program(slot, starting_weight(slot)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(program.id(), program.name(), started_at, exercises)
    }

    #[must_use]
    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn exercises(&self) -> &[WorkoutExercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise(&self, index: usize) -> Option<&WorkoutExercise> {
        self.exercises.get(index)
    }

    /// # Errors
    ///
    /// Returns `WorkoutError::IndexOutOfRange` for an invalid index.
    pub fn exercise_mut(&mut self, index: usize) -> Result<&mut WorkoutExercise, WorkoutError> {
        self.exercises
            .get_mut(index)
            .ok_or(WorkoutError::IndexOutOfRange { index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    #[must_use]
    pub fn completed_exercises(&self) -> usize {
        self.exercises.iter().filter(|e| e.is_complete()).count()
    }

    /// True iff there is at least one exercise and all of them are complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.exercises.is_empty() && self.completed_exercises() == self.exercises.len()
    }

    #[must_use]
    pub fn total_sets_completed(&self) -> usize {
        self.exercises.iter().map(WorkoutExercise::completed_sets).sum()
    }

    /// Sum of `weight * (completed reps or target reps)` over every set.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        total_volume(&self.exercises)
    }

    /// Swap two exercises.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutError::IndexOutOfRange` if either index is invalid.
    pub fn swap_exercises(&mut self, a: usize, b: usize) -> Result<(), WorkoutError> {
        let len = self.exercises.len();
        for index in [a, b] {
            if index >= len {
                return Err(WorkoutError::IndexOutOfRange { index });
            }
        }
        self.exercises.swap(a, b);
        Ok(())
    }

    /// Summary of the workout as of `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutSummaryError::InvalidTimeRange` if `completed_at` is
    /// before the start.
    pub fn summary(&self, completed_at: DateTime<Utc>) -> Result<WorkoutSummary, WorkoutSummaryError> {
        WorkoutSummary::from_persisted(
            self.started_at,
            completed_at,
            u32::try_from(self.completed_exercises()).unwrap_or(u32::MAX),
            u32::try_from(self.exercises.len()).unwrap_or(u32::MAX),
            u32::try_from(self.total_sets_completed()).unwrap_or(u32::MAX),
            self.total_volume(),
        )
    }
}

/// Pure volume computation over any exercise list.
#[must_use]
pub fn total_volume(exercises: &[WorkoutExercise]) -> f64 {
    exercises.iter().map(WorkoutExercise::volume).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseId, SetDifficulty, UserId, WorkoutSet};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn exercise(id: u64, sets: u32, weight: f64) -> WorkoutExercise {
        let slot = ProgramExercise::new(ExerciseId::new(id), "Lift", "Chest", sets, 10, 60).unwrap();
        WorkoutExercise::from_program(&slot, weight).unwrap()
    }

    #[test]
    fn empty_workout_is_rejected() {
        let err = Workout::new(ProgramId::new(1), "Empty", fixed_now(), vec![]).unwrap_err();
        assert_eq!(err, WorkoutError::Empty);
    }

    #[test]
    fn volume_counts_completed_reps() {
        let mut set = WorkoutSet::planned(1, 10, 80.0).unwrap();
        set.complete(8, 80.0, SetDifficulty::Normal).unwrap();
        let ex = WorkoutExercise::new(ExerciseId::new(1), "Bench", "Chest", 90, None, vec![set])
            .unwrap();
        assert!((total_volume(&[ex]) - 640.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volume_counts_target_reps_for_incomplete_sets() {
        let ex = exercise(1, 1, 50.0);
        assert!((total_volume(&[ex]) - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completion_requires_every_exercise() {
        let mut workout = Workout::new(
            ProgramId::new(1),
            "Push",
            fixed_now(),
            vec![exercise(1, 1, 20.0), exercise(2, 1, 20.0)],
        )
        .unwrap();
        workout
            .exercise_mut(0)
            .unwrap()
            .complete_current(10, 20.0, SetDifficulty::Normal)
            .unwrap();
        assert_eq!(workout.completed_exercises(), 1);
        assert!(!workout.is_complete());

        workout
            .exercise_mut(1)
            .unwrap()
            .complete_current(10, 20.0, SetDifficulty::Normal)
            .unwrap();
        assert!(workout.is_complete());
        assert_eq!(workout.total_sets_completed(), 2);
    }

    #[test]
    fn swap_rejects_out_of_range() {
        let mut workout =
            Workout::new(ProgramId::new(1), "Push", fixed_now(), vec![exercise(1, 1, 0.0)]).unwrap();
        assert_eq!(
            workout.swap_exercises(0, 1).unwrap_err(),
            WorkoutError::IndexOutOfRange { index: 1 }
        );
    }

    #[test]
    fn from_program_uses_weight_lookup() {
        let program = Program::new(
            ProgramId::new(3),
            UserId::new(1),
            "Legs",
            vec![
                ProgramExercise::new(ExerciseId::new(1), "Squat", "Legs", 3, 5, 180).unwrap(),
                ProgramExercise::new(ExerciseId::new(2), "Lunge", "Legs", 2, 12, 60).unwrap(),
            ],
            fixed_now(),
        )
        .unwrap();
        let workout = Workout::from_program(&program, fixed_now(), |slot| {
            if slot.exercise_id() == ExerciseId::new(1) { 100.0 } else { 0.0 }
        })
        .unwrap();
        assert_eq!(workout.len(), 2);
        assert_eq!(workout.exercises()[0].sets()[0].weight(), Some(100.0));

        let summary = workout.summary(fixed_now() + Duration::minutes(30)).unwrap();
        assert_eq!(summary.sets_completed(), 0);
    }
}
