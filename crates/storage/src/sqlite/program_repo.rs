use dreppy_core::model::{Program, ProgramExercise, ProgramId, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    conn, id_to_i64, map_catalog_row, program_id_from_i64, ser, u32_from_i64, user_id_from_i64,
};
use crate::repository::{NewProgramRecord, ProgramRepository, StorageError};

impl SqliteRepository {
    async fn program_exercises(&self, program_id: i64) -> Result<Vec<ProgramExercise>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    e.id, e.name, e.equipment, e.body_part, e.target_muscle, e.rating,
                    pe.target_sets, pe.target_reps, pe.rest_seconds
                FROM program_exercises pe
                JOIN exercises e ON e.id = pe.exercise_id
                WHERE pe.program_id = ?1
                ORDER BY pe.order_index ASC
            ",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let catalog = map_catalog_row(&row)?;
            let slot = ProgramExercise::new(
                catalog.id,
                catalog.name.clone(),
                catalog.muscle_group(),
                u32_from_i64("target_sets", row.try_get::<i64, _>("target_sets").map_err(ser)?)?,
                u32_from_i64("target_reps", row.try_get::<i64, _>("target_reps").map_err(ser)?)?,
                u32_from_i64("rest_seconds", row.try_get::<i64, _>("rest_seconds").map_err(ser)?)?,
            )
            .map_err(ser)?;
            out.push(slot);
        }
        Ok(out)
    }

    async fn load_program(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Program, StorageError> {
        let id: i64 = row.try_get("id").map_err(ser)?;
        let exercises = self.program_exercises(id).await?;
        Program::new(
            program_id_from_i64(id)?,
            user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?,
            row.try_get::<String, _>("name").map_err(ser)?,
            exercises,
            row.try_get("updated_at").map_err(ser)?,
        )
        .map_err(ser)
    }
}

#[async_trait::async_trait]
impl ProgramRepository for SqliteRepository {
    async fn insert_program(&self, program: NewProgramRecord) -> Result<ProgramId, StorageError> {
        let owner = id_to_i64("user_id", program.owner.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO programs (user_id, name, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?3)
            ",
        )
        .bind(owner)
        .bind(program.name.trim())
        .bind(program.created_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        let program_id = res.last_insert_rowid();

        for (index, slot) in program.exercises.iter().enumerate() {
            sqlx::query(
                r"
                    INSERT INTO program_exercises (
                        program_id, exercise_id, order_index,
                        target_sets, target_reps, rest_seconds
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(program_id)
            .bind(id_to_i64("exercise_id", slot.exercise_id().value())?)
            .bind(i64::try_from(index).map_err(ser)?)
            .bind(i64::from(slot.target_sets()))
            .bind(i64::from(slot.target_reps()))
            .bind(i64::from(slot.rest_seconds()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        program_id_from_i64(program_id)
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, name, updated_at
                FROM programs
                WHERE id = ?1
            ",
        )
        .bind(id_to_i64("program_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match row {
            Some(row) => Ok(Some(self.load_program(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list_programs(&self, owner: UserId, limit: u32) -> Result<Vec<Program>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, name, updated_at
                FROM programs
                WHERE user_id = ?1
                ORDER BY updated_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(id_to_i64("user_id", owner.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(self.load_program(row).await?);
        }
        Ok(out)
    }

    async fn delete_program(&self, owner: UserId, id: ProgramId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM programs WHERE id = ?1 AND user_id = ?2")
            .bind(id_to_i64("program_id", id.value())?)
            .bind(id_to_i64("user_id", owner.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
