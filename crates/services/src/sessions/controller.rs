use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dreppy_core::coaching::{TimeOfDay, TipMode, TrainingGoal};
use dreppy_core::model::{
    CatalogExercise, ExerciseHistory, ExerciseId, SetAdvance, SetDifficulty, Workout,
    WorkoutExercise, WorkoutError, WorkoutSummary,
};
use dreppy_core::rest::RestWindow;
use tracing::debug;

use crate::coaching::TipRequest;
use crate::error::SessionError;
use crate::program_service::MoveDirection;

use super::progress::SessionProgress;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Where the session moved after a completed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextSet,
    NextExercise { index: usize },
    /// Last set of the last exercise; no rest follows.
    EndOfWorkout,
}

/// Where the session moved after a skipped set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    NextSet,
    NextExercise { index: usize },
    /// Nothing follows; the skip did nothing.
    AtEnd,
}

/// A set that was just marked complete, with everything needed to persist it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSet {
    pub exercise_index: usize,
    pub exercise_id: ExerciseId,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
    pub difficulty: SetDifficulty,
    pub completed_at: DateTime<Utc>,
    pub advance: Advance,
    pub rest: Option<RestWindow>,
}

/// Identifies the context a tip was requested for, including the
/// selector values the request was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTag {
    pub exercise: ExerciseId,
    pub sequence: u64,
    pub weight: f64,
    pub reps: u32,
}

/// The last tip shown and the numbers it was written for.
#[derive(Debug, Clone, PartialEq)]
pub struct TipContext {
    pub text: String,
    pub weight: f64,
    pub reps: u32,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// In-memory state of an active workout.
///
/// Every transition goes through `&mut self`; async work (persistence, tips,
/// chat) happens outside and feeds results back in tagged form.
#[derive(Debug, Clone)]
pub struct WorkoutController {
    workout: Workout,
    active: usize,
    pending_reps: u32,
    pending_weight: f64,
    pending_difficulty: SetDifficulty,
    last_difficulty: Option<SetDifficulty>,
    rest: Option<RestWindow>,
    tip: Option<TipContext>,
    histories: HashMap<ExerciseId, ExerciseHistory>,
    tip_sequence: u64,
    tip_mode: TipMode,
    training_goal: TrainingGoal,
}

impl WorkoutController {
    #[must_use]
    pub fn new(
        workout: Workout,
        histories: HashMap<ExerciseId, ExerciseHistory>,
        training_goal: TrainingGoal,
    ) -> Self {
        let mut controller = Self {
            workout,
            active: 0,
            pending_reps: 0,
            pending_weight: 0.0,
            pending_difficulty: SetDifficulty::Normal,
            last_difficulty: None,
            rest: None,
            tip: None,
            histories,
            tip_sequence: 0,
            tip_mode: TipMode::Quick,
            training_goal,
        };
        controller.sync_pending();
        controller
    }

    #[must_use]
    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active_exercise(&self) -> Option<&WorkoutExercise> {
        self.workout.exercise(self.active)
    }

    #[must_use]
    pub fn history(&self, exercise: ExerciseId) -> Option<&ExerciseHistory> {
        self.histories.get(&exercise)
    }

    #[must_use]
    pub fn training_goal(&self) -> TrainingGoal {
        self.training_goal
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total_exercises: self.workout.len(),
            completed_exercises: self.workout.completed_exercises(),
            sets_completed: self.workout.total_sets_completed(),
            is_complete: self.workout.is_complete(),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.workout.is_complete()
    }

    /// # Errors
    ///
    /// Returns `SessionError::Summary` if `completed_at` predates the start.
    pub fn summary(&self, completed_at: DateTime<Utc>) -> Result<WorkoutSummary, SessionError> {
        Ok(self.workout.summary(completed_at)?)
    }

    // ─── pending selectors ───────────────────────────────────────────────────

    #[must_use]
    pub fn pending_reps(&self) -> u32 {
        self.pending_reps
    }

    #[must_use]
    pub fn pending_weight(&self) -> f64 {
        self.pending_weight
    }

    #[must_use]
    pub fn pending_difficulty(&self) -> SetDifficulty {
        self.pending_difficulty
    }

    #[must_use]
    pub fn last_difficulty(&self) -> Option<SetDifficulty> {
        self.last_difficulty
    }

    pub fn set_pending_reps(&mut self, reps: u32) {
        self.pending_reps = reps;
    }

    pub fn set_pending_weight(&mut self, weight: f64) {
        if weight.is_finite() {
            self.pending_weight = weight.max(0.0);
        }
    }

    /// Nudge the weight selector, never below zero.
    pub fn adjust_weight(&mut self, delta: f64) {
        self.set_pending_weight(self.pending_weight + delta);
    }

    pub fn set_pending_difficulty(&mut self, difficulty: SetDifficulty) {
        self.pending_difficulty = difficulty;
    }

    fn sync_pending(&mut self) {
        let planned = self
            .active_exercise()
            .and_then(WorkoutExercise::current)
            .map(|set| (set.target_reps(), set.weight().unwrap_or(0.0)));
        if let Some((reps, weight)) = planned {
            self.pending_reps = reps;
            self.pending_weight = weight;
        }
    }

    // ─── sets ────────────────────────────────────────────────────────────────

    /// Complete the active exercise's current set with the pending selectors.
    ///
    /// # Errors
    ///
    /// See [`WorkoutController::complete_set`].
    pub fn complete_pending(&mut self, now: DateTime<Utc>) -> Result<CompletedSet, SessionError> {
        self.complete_set(self.pending_reps, self.pending_weight, self.pending_difficulty, now)
    }

    /// Mark the current set complete, advance, and open a rest window unless
    /// the workout just ran out of sets.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPendingSet` when the current set is already
    /// completed, or `SessionError::Exercise` for an invalid weight. State is
    /// untouched on error.
    pub fn complete_set(
        &mut self,
        reps: u32,
        weight: f64,
        difficulty: SetDifficulty,
        now: DateTime<Utc>,
    ) -> Result<CompletedSet, SessionError> {
        let index = self.active;
        let is_last_exercise = index + 1 >= self.workout.len();
        let exercise = self.workout.exercise_mut(index)?;
        if !exercise.has_pending_set() {
            return Err(SessionError::NoPendingSet);
        }

        let exercise_id = exercise.id();
        let set_number = exercise.current_set();
        let rest_seconds = exercise.rest_seconds();

        let advance = match exercise.complete_current(reps, weight, difficulty)? {
            SetAdvance::NextSet => Advance::NextSet,
            SetAdvance::LastSet if !is_last_exercise => {
                self.active = index + 1;
                Advance::NextExercise { index: index + 1 }
            }
            SetAdvance::LastSet => Advance::EndOfWorkout,
        };

        self.last_difficulty = Some(difficulty);
        self.pending_difficulty = SetDifficulty::Normal;
        self.sync_pending();

        let rest = match advance {
            Advance::EndOfWorkout => None,
            Advance::NextSet | Advance::NextExercise { .. } => {
                Some(RestWindow::start(now, rest_seconds))
            }
        };
        self.rest = rest;
        if rest.is_some() {
            self.tip = None;
        }

        Ok(CompletedSet {
            exercise_index: index,
            exercise_id,
            set_number,
            reps,
            weight,
            difficulty,
            completed_at: now,
            advance,
            rest,
        })
    }

    /// Move past the current set without completing it. No rest follows.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Workout` if the active index is out of range.
    pub fn skip_set(&mut self) -> Result<SkipOutcome, SessionError> {
        let index = self.active;
        let is_last_exercise = index + 1 >= self.workout.len();
        let exercise = self.workout.exercise(index).ok_or(WorkoutError::IndexOutOfRange { index })?;

        if exercise.is_on_last_set() {
            if is_last_exercise {
                return Ok(SkipOutcome::AtEnd);
            }
            self.active = index + 1;
            self.sync_pending();
            return Ok(SkipOutcome::NextExercise { index: index + 1 });
        }

        self.workout.exercise_mut(index)?.skip_current();
        self.sync_pending();
        Ok(SkipOutcome::NextSet)
    }

    // ─── rest ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn rest(&self) -> Option<&RestWindow> {
        self.rest.as_ref()
    }

    #[must_use]
    pub fn is_resting(&self) -> bool {
        self.rest.is_some()
    }

    /// Recompute the countdown; closes the window once it hits zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<u32> {
        let remaining = self.rest?.remaining_secs(now);
        if remaining == 0 {
            self.rest = None;
            return None;
        }
        Some(remaining)
    }

    pub fn skip_rest(&mut self) {
        self.rest = None;
    }

    // ─── navigation ──────────────────────────────────────────────────────────

    /// Make `index` the active exercise, clamped to the workout.
    pub fn go_to(&mut self, index: usize) -> usize {
        let last = self.workout.len().saturating_sub(1);
        let target = index.min(last);
        if target != self.active {
            self.active = target;
            self.sync_pending();
        }
        self.active
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.active.saturating_add(1))
    }

    pub fn previous(&mut self) -> usize {
        self.go_to(self.active.saturating_sub(1))
    }

    /// Swap the active exercise with its neighbour; the pointer follows it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Workout` if the swap fails.
    pub fn reorder(&mut self, direction: MoveDirection) -> Result<bool, SessionError> {
        let Some(target) = direction.target(self.active, self.workout.len()) else {
            return Ok(false);
        };
        self.workout.swap_exercises(self.active, target)?;
        self.active = target;
        Ok(true)
    }

    /// Replace the active exercise before any of its sets were completed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Exercise` once a set was completed.
    pub fn substitute(&mut self, replacement: &CatalogExercise) -> Result<(), SessionError> {
        let exercise = self.workout.exercise_mut(self.active)?;
        exercise.substitute(
            replacement.id,
            replacement.name.clone(),
            replacement.muscle_group(),
        )?;
        self.tip = None;
        Ok(())
    }

    /// Adopt a history fetched for a substituted exercise.
    pub fn insert_history(&mut self, exercise: ExerciseId, history: ExerciseHistory) {
        self.histories.insert(exercise, history);
    }

    // ─── tips ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn tip_mode(&self) -> TipMode {
        self.tip_mode
    }

    pub fn set_tip_mode(&mut self, mode: TipMode) {
        self.tip_mode = mode;
    }

    #[must_use]
    pub fn tip(&self) -> Option<&TipContext> {
        self.tip.as_ref()
    }

    /// Issue a tag for a new tip request; older tags become stale.
    pub fn begin_tip(&mut self) -> Option<RequestTag> {
        let exercise = self.active_exercise()?.id();
        self.tip_sequence += 1;
        Some(RequestTag {
            exercise,
            sequence: self.tip_sequence,
            weight: self.pending_weight,
            reps: self.pending_reps,
        })
    }

    #[must_use]
    pub fn is_current(&self, tag: RequestTag) -> bool {
        tag.sequence == self.tip_sequence
            && self.active_exercise().is_some_and(|e| e.id() == tag.exercise)
    }

    /// Store a tip if it answers the latest request; stale tips are dropped.
    pub fn accept_tip(&mut self, tag: RequestTag, text: impl Into<String>) -> bool {
        if !self.is_current(tag) {
            debug!(exercise = %tag.exercise, sequence = tag.sequence, "dropping stale tip");
            return false;
        }
        if !self.is_resting() {
            self.tip = Some(TipContext {
                text: text.into(),
                weight: tag.weight,
                reps: tag.reps,
            });
        }
        true
    }

    /// Snapshot of the active exercise for the coaching endpoint.
    #[must_use]
    pub fn tip_request(&self, now: DateTime<Utc>, hour: u32) -> Option<TipRequest> {
        let exercise = self.active_exercise()?;
        let history = self.histories.get(&exercise.id()).copied().unwrap_or_default();
        let is_resting = self.is_resting();
        let previous = if is_resting { None } else { self.tip.as_ref() };
        let elapsed = (now - self.workout.started_at()).num_minutes().max(0);

        Some(TipRequest {
            exercise_name: exercise.name().to_owned(),
            muscle_group: exercise.muscle_group().to_owned(),
            current_weight: self.pending_weight,
            current_reps: self.pending_reps,
            last_weight: history.last_weight,
            last_reps: history.last_reps,
            pr_weight: history.pr_weight(),
            pr_reps: history.pr_reps(),
            training_goal: self.training_goal,
            previous_tip: previous.map(|t| t.text.clone()),
            previous_weight: previous.map(|t| t.weight),
            previous_reps: previous.map(|t| t.reps),
            is_resting,
            rest_time_left: self.rest.map(|r| r.remaining_secs(now)),
            current_set: Some(exercise.current_set()),
            total_sets: Some(exercise.total_sets()),
            last_set_difficulty: self.last_difficulty,
            time_of_day: Some(TimeOfDay::from_hour(hour)),
            workout_duration: Some(u32::try_from(elapsed).unwrap_or(u32::MAX)),
            total_sets_completed: Some(
                u32::try_from(self.workout.total_sets_completed()).unwrap_or(u32::MAX),
            ),
            tip_mode: self.tip_mode,
        })
    }
}
