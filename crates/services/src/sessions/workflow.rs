use std::collections::HashMap;
use std::sync::Arc;

use dreppy_core::coaching::TrainingGoal;
use dreppy_core::model::{
    CatalogExercise, ExerciseHistory, ProgramId, SessionId, UserId, Workout, WorkoutSummary,
};
use storage::repository::{
    CompletedSetRecord, HistoryRepository, ProfileRepository, ProgramRepository,
    WorkoutLogRepository,
};
use tracing::{info, warn};

use super::controller::{CompletedSet, WorkoutController};
use super::queries::SessionQueries;
use crate::Clock;
use crate::coaching::TipRequest;
use crate::error::SessionError;

/// Why no workout could be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoWorkoutReason {
    NoProgramSelected,
    ProgramNotFound,
    EmptyProgram,
}

impl NoWorkoutReason {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            NoWorkoutReason::NoProgramSelected => {
                "No program was selected. Please go back and choose a workout program."
            }
            NoWorkoutReason::ProgramNotFound => "This program could not be found.",
            NoWorkoutReason::EmptyProgram => {
                "This program doesn't have any exercises yet. Add exercises to your program first."
            }
        }
    }
}

/// A running workout plus its persistence bookkeeping.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    controller: WorkoutController,
    owner: Option<UserId>,
    session_id: Option<SessionId>,
}

impl ActiveSession {
    #[must_use]
    pub fn controller(&self) -> &WorkoutController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WorkoutController {
        &mut self.controller
    }

    #[must_use]
    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    /// Row id once the first completed set was written.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }
}

/// Outcome of opening a program.
#[derive(Debug, Clone)]
pub enum SessionStart {
    Ready(ActiveSession),
    NoWorkout { reason: NoWorkoutReason },
}

/// Opens workouts and writes their progress to the workout log.
#[derive(Clone)]
pub struct WorkoutLoopService {
    clock: Clock,
    programs: Arc<dyn ProgramRepository>,
    history: Arc<dyn HistoryRepository>,
    log: Arc<dyn WorkoutLogRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl WorkoutLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        programs: Arc<dyn ProgramRepository>,
        history: Arc<dyn HistoryRepository>,
        log: Arc<dyn WorkoutLogRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            programs,
            history,
            log,
            profiles,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Build a fresh workout from a program.
    ///
    /// Sets are pre-filled with the owner's most recent weight for each
    /// exercise. Nothing is written until the first set is completed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the program lookup fails.
    pub async fn start(
        &self,
        program_id: Option<ProgramId>,
        owner: Option<UserId>,
    ) -> Result<SessionStart, SessionError> {
        let Some(program_id) = program_id else {
            return Ok(SessionStart::NoWorkout {
                reason: NoWorkoutReason::NoProgramSelected,
            });
        };
        let Some(program) = self.programs.get_program(program_id).await? else {
            return Ok(SessionStart::NoWorkout {
                reason: NoWorkoutReason::ProgramNotFound,
            });
        };
        if program.is_empty() {
            return Ok(SessionStart::NoWorkout {
                reason: NoWorkoutReason::EmptyProgram,
            });
        }

        let (histories, goal) = match owner {
            Some(owner) => (
                SessionQueries::histories(self.history.as_ref(), owner, &program).await,
                SessionQueries::training_goal(self.profiles.as_ref(), owner).await,
            ),
            None => (HashMap::new(), TrainingGoal::default()),
        };

        let workout = Workout::from_program(&program, self.clock.now(), |slot| {
            histories
                .get(&slot.exercise_id())
                .map_or(0.0, ExerciseHistory::starting_weight)
        })?;
        info!(program = %program_id, exercises = workout.len(), "workout started");

        Ok(SessionStart::Ready(ActiveSession {
            controller: WorkoutController::new(workout, histories, goal),
            owner,
            session_id: None,
        }))
    }

    /// Complete the current set with the pending selectors and log it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the set cannot be completed. Logging
    /// failures are only reported through `tracing`.
    pub async fn complete_set(
        &self,
        session: &mut ActiveSession,
    ) -> Result<CompletedSet, SessionError> {
        let completed = session.controller.complete_pending(self.clock.now())?;
        self.persist(session, &completed).await;
        Ok(completed)
    }

    async fn persist(&self, session: &mut ActiveSession, set: &CompletedSet) {
        let Some(owner) = session.owner else {
            return;
        };

        let session_id = match session.session_id {
            Some(id) => id,
            None => {
                let workout = session.controller.workout();
                match self
                    .log
                    .start_session(owner, workout.program_id(), workout.name(), workout.started_at())
                    .await
                {
                    Ok(id) => {
                        session.session_id = Some(id);
                        id
                    }
                    Err(err) => {
                        warn!(error = %err, user = %owner, "failed to create workout session row");
                        return;
                    }
                }
            }
        };

        let order_index = u32::try_from(set.exercise_index).unwrap_or(u32::MAX);
        let row = match self
            .log
            .ensure_session_exercise(session_id, set.exercise_id, order_index)
            .await
        {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, session = %session_id, exercise = %set.exercise_id, "failed to record session exercise");
                return;
            }
        };

        let record = CompletedSetRecord {
            set_number: set.set_number,
            reps: set.reps,
            weight: set.weight,
            difficulty: set.difficulty,
            completed_at: set.completed_at,
        };
        if let Err(err) = self.log.append_set(row, &record).await {
            warn!(error = %err, session = %session_id, set = set.set_number, "failed to save completed set");
        }
    }

    /// Close the workout and stamp the session row when one exists.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the clock went backwards.
    pub async fn finish(&self, session: &ActiveSession) -> Result<WorkoutSummary, SessionError> {
        let now = self.clock.now();
        let summary = session.controller.summary(now)?;
        if let Some(id) = session.session_id {
            if let Err(err) = self.log.complete_session(id, now).await {
                warn!(error = %err, session = %id, "failed to mark session completed");
            }
        }
        info!(
            sets = summary.sets_completed(),
            volume = summary.total_volume(),
            "workout finished"
        );
        Ok(summary)
    }

    /// Swap the active exercise and pull the replacement's history.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Exercise` once a set of the active exercise
    /// was completed.
    pub async fn substitute(
        &self,
        session: &mut ActiveSession,
        replacement: &CatalogExercise,
    ) -> Result<(), SessionError> {
        session.controller.substitute(replacement)?;
        if let Some(owner) = session.owner {
            if let Some(found) =
                SessionQueries::history_for(self.history.as_ref(), owner, replacement.id).await
            {
                session.controller.insert_history(replacement.id, found);
            }
        }
        Ok(())
    }

    /// Tip request for the active exercise as of now. `local_hour` is the
    /// user's wall-clock hour (0-23); the server clock is UTC.
    #[must_use]
    pub fn tip_request(&self, session: &ActiveSession, local_hour: u32) -> Option<TipRequest> {
        session
            .controller
            .tip_request(self.clock.now(), local_hour)
    }
}
