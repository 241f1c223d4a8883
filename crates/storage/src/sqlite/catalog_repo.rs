use dreppy_core::model::{CatalogExercise, CatalogFilter, ExerciseId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_catalog_row, ser};
use crate::repository::{ExerciseCatalogRepository, StorageError};

const CATALOG_COLUMNS: &str = "id, name, equipment, body_part, target_muscle, rating";

#[async_trait::async_trait]
impl ExerciseCatalogRepository for SqliteRepository {
    async fn upsert_exercise(&self, exercise: &CatalogExercise) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO exercises (id, name, equipment, body_part, target_muscle, rating)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    equipment = excluded.equipment,
                    body_part = excluded.body_part,
                    target_muscle = excluded.target_muscle,
                    rating = excluded.rating
            ",
        )
        .bind(id_to_i64("exercise_id", exercise.id.value())?)
        .bind(&exercise.name)
        .bind(&exercise.equipment)
        .bind(&exercise.body_part)
        .bind(&exercise.target_muscle)
        .bind(exercise.rating)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_exercise(&self, id: ExerciseId) -> Result<Option<CatalogExercise>, StorageError> {
        let sql = format!("SELECT {CATALOG_COLUMNS} FROM exercises WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("exercise_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_catalog_row).transpose()
    }

    async fn top_rated(&self, limit: u32) -> Result<Vec<CatalogExercise>, StorageError> {
        self.search(&CatalogFilter {
            limit: usize::try_from(limit).map_err(ser)?,
            ..CatalogFilter::default()
        })
        .await
    }

    async fn search(&self, filter: &CatalogFilter) -> Result<Vec<CatalogExercise>, StorageError> {
        let mut sql = format!("SELECT {CATALOG_COLUMNS} FROM exercises WHERE 1 = 1");

        let mut bind_index = 1;
        if filter.name_contains.is_some() {
            sql.push_str(" AND name LIKE ?");
            sql.push_str(&bind_index.to_string());
            sql.push_str(" ESCAPE '\\'");
            bind_index += 1;
        }
        if filter.body_part.is_some() {
            sql.push_str(" AND body_part = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if filter.equipment.is_some() {
            sql.push_str(" AND equipment = ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        sql.push_str(" ORDER BY rating DESC, id ASC LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql);
        if let Some(needle) = &filter.name_contains {
            query = query.bind(format!("%{}%", escape_like(needle.trim())));
        }
        if let Some(body_part) = &filter.body_part {
            query = query.bind(body_part);
        }
        if let Some(equipment) = &filter.equipment {
            query = query.bind(equipment);
        }
        query = query.bind(i64::try_from(filter.limit).map_err(ser)?);

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;
        rows.iter().map(map_catalog_row).collect()
    }
}

/// SQLite `LIKE` is case-insensitive for ASCII; escape its wildcards.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_db"), "50\\%\\_db");
    }
}
