use dreppy_core::model::{ExerciseId, SetPerformance, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_performance_row};
use crate::repository::{HistoryRepository, StorageError};

#[async_trait::async_trait]
impl HistoryRepository for SqliteRepository {
    async fn sets_for_exercise(
        &self,
        owner: UserId,
        exercise: ExerciseId,
    ) -> Result<Vec<SetPerformance>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    se.exercise_id AS exercise_id,
                    COALESCE(e.name, '') AS exercise_name,
                    cs.weight AS weight,
                    cs.reps AS reps,
                    cs.created_at AS created_at
                FROM completed_sets cs
                JOIN session_exercises se ON se.id = cs.session_exercise_id
                JOIN workout_sessions ws ON ws.id = se.session_id
                LEFT JOIN exercises e ON e.id = se.exercise_id
                WHERE ws.user_id = ?1 AND se.exercise_id = ?2
                ORDER BY cs.created_at DESC, cs.id DESC
            ",
        )
        .bind(id_to_i64("user_id", owner.value())?)
        .bind(id_to_i64("exercise_id", exercise.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_performance_row).collect()
    }

    async fn recent_sets(&self, owner: UserId, limit: u32) -> Result<Vec<SetPerformance>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    se.exercise_id AS exercise_id,
                    COALESCE(e.name, '') AS exercise_name,
                    cs.weight AS weight,
                    cs.reps AS reps,
                    cs.created_at AS created_at
                FROM completed_sets cs
                JOIN session_exercises se ON se.id = cs.session_exercise_id
                JOIN workout_sessions ws ON ws.id = se.session_id
                LEFT JOIN exercises e ON e.id = se.exercise_id
                WHERE ws.user_id = ?1
                ORDER BY cs.created_at DESC, cs.id DESC
                LIMIT ?2
            ",
        )
        .bind(id_to_i64("user_id", owner.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_performance_row).collect()
    }
}
