use chrono::{DateTime, Utc};
use dreppy_core::model::{ExerciseId, ProgramId, SessionId, SessionRecord, SessionStatus, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_session_row, ser, session_id_from_i64};
use crate::repository::{CompletedSetRecord, SessionExerciseId, StorageError, WorkoutLogRepository};

#[async_trait::async_trait]
impl WorkoutLogRepository for SqliteRepository {
    async fn start_session(
        &self,
        owner: UserId,
        program_id: ProgramId,
        name: &str,
        started_at: DateTime<Utc>,
    ) -> Result<SessionId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO workout_sessions (user_id, program_id, name, status, started_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("user_id", owner.value())?)
        .bind(id_to_i64("program_id", program_id.value())?)
        .bind(name)
        .bind(SessionStatus::InProgress.as_str())
        .bind(started_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        session_id_from_i64(res.last_insert_rowid())
    }

    async fn ensure_session_exercise(
        &self,
        session: SessionId,
        exercise: ExerciseId,
        order_index: u32,
    ) -> Result<SessionExerciseId, StorageError> {
        let session_id = id_to_i64("session_id", session.value())?;
        let exercise_id = id_to_i64("exercise_id", exercise.value())?;

        let exists = sqlx::query("SELECT 1 FROM workout_sessions WHERE id = ?1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        sqlx::query(
            r"
                INSERT INTO session_exercises (session_id, exercise_id, order_index)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(session_id, exercise_id) DO NOTHING
            ",
        )
        .bind(session_id)
        .bind(exercise_id)
        .bind(i64::from(order_index))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let row = sqlx::query(
            r"
                SELECT id FROM session_exercises
                WHERE session_id = ?1 AND exercise_id = ?2
            ",
        )
        .bind(session_id)
        .bind(exercise_id)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        Ok(SessionExerciseId(row.try_get("id").map_err(ser)?))
    }

    async fn append_set(
        &self,
        session_exercise: SessionExerciseId,
        set: &CompletedSetRecord,
    ) -> Result<(), StorageError> {
        let exists = sqlx::query("SELECT 1 FROM session_exercises WHERE id = ?1")
            .bind(session_exercise.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if exists.is_none() {
            return Err(StorageError::NotFound);
        }

        sqlx::query(
            r"
                INSERT INTO completed_sets (
                    session_exercise_id, set_number, reps, weight, difficulty, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(session_exercise.0)
        .bind(i64::from(set.set_number))
        .bind(i64::from(set.reps))
        .bind(set.weight)
        .bind(set.difficulty.as_str())
        .bind(set.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn complete_session(
        &self,
        session: SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
                UPDATE workout_sessions
                SET status = ?2, completed_at = ?3
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("session_id", session.value())?)
        .bind(SessionStatus::Completed.as_str())
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_sessions(
        &self,
        owner: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map_or(-1, i64::from);
        let rows = sqlx::query(
            r"
                SELECT id, program_id, name, status, started_at, completed_at
                FROM workout_sessions
                WHERE user_id = ?1
                ORDER BY started_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(id_to_i64("user_id", owner.value())?)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_session_row).collect()
    }
}
