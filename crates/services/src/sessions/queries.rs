use std::collections::HashMap;

use dreppy_core::coaching::TrainingGoal;
use dreppy_core::model::{ExerciseHistory, ExerciseId, Program, UserId};
use storage::repository::{HistoryRepository, ProfileRepository};
use tracing::warn;

/// Storage-backed lookups needed to open a workout.
pub(crate) struct SessionQueries;

impl SessionQueries {
    /// Prior performance for every exercise in `program`. A failed lookup
    /// leaves that exercise without history.
    pub async fn histories(
        history: &dyn HistoryRepository,
        owner: UserId,
        program: &Program,
    ) -> HashMap<ExerciseId, ExerciseHistory> {
        let mut out = HashMap::with_capacity(program.exercises().len());
        for slot in program.exercises() {
            let id = slot.exercise_id();
            if out.contains_key(&id) {
                continue;
            }
            if let Some(found) = Self::history_for(history, owner, id).await {
                out.insert(id, found);
            }
        }
        out
    }

    pub async fn history_for(
        history: &dyn HistoryRepository,
        owner: UserId,
        exercise: ExerciseId,
    ) -> Option<ExerciseHistory> {
        match history.sets_for_exercise(owner, exercise).await {
            Ok(sets) if sets.is_empty() => None,
            Ok(sets) => Some(ExerciseHistory::from_sets(&sets)),
            Err(err) => {
                warn!(error = %err, exercise = %exercise, "exercise history lookup failed");
                None
            }
        }
    }

    /// Coaching goal from the user's profile; hypertrophy when unknown.
    pub async fn training_goal(profiles: &dyn ProfileRepository, owner: UserId) -> TrainingGoal {
        match profiles.get_profile(owner).await {
            Ok(Some(record)) => record.profile.training_goal(),
            Ok(None) => TrainingGoal::default(),
            Err(err) => {
                warn!(error = %err, user = %owner, "profile lookup failed");
                TrainingGoal::default()
            }
        }
    }
}
