use dreppy_core::model::{ExperienceLevel, Profile, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, goals_from_text, goals_to_text, id_to_i64, ser};
use crate::repository::{ProfileRecord, ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        let profile = &record.profile;
        sqlx::query(
            r"
                INSERT INTO profiles (
                    user_id, email, display_name, goals, experience, training_days, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(user_id) DO UPDATE SET
                    email = excluded.email,
                    display_name = excluded.display_name,
                    goals = excluded.goals,
                    experience = excluded.experience,
                    training_days = excluded.training_days,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(id_to_i64("user_id", profile.user_id().value())?)
        .bind(&record.email)
        .bind(profile.display_name())
        .bind(goals_to_text(profile.goals()))
        .bind(profile.experience().map(ExperienceLevel::as_str))
        .bind(i64::from(profile.training_days()))
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT email, display_name, goals, experience, training_days, updated_at
                FROM profiles
                WHERE user_id = ?1
            ",
        )
        .bind(id_to_i64("user_id", user.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let goals: String = row.try_get("goals").map_err(ser)?;
        let experience = row
            .try_get::<Option<String>, _>("experience")
            .map_err(ser)?
            .map(|s| s.parse::<ExperienceLevel>().map_err(ser))
            .transpose()?;
        let training_days = u8::try_from(row.try_get::<i64, _>("training_days").map_err(ser)?)
            .map_err(ser)?;

        let profile = Profile::new(
            user,
            row.try_get::<String, _>("display_name").map_err(ser)?,
            goals_from_text(&goals)?,
            experience,
            training_days,
        )
        .map_err(ser)?;

        Ok(Some(ProfileRecord {
            profile,
            email: row.try_get("email").map_err(ser)?,
            updated_at: row.try_get("updated_at").map_err(ser)?,
        }))
    }
}
