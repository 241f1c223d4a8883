use chrono::{DateTime, Utc};
use dreppy_core::model::{
    CatalogExercise, ExerciseId, FitnessGoal, ProgramId, SessionId, SessionRecord, SessionStatus,
    SetPerformance, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn program_id_from_i64(v: i64) -> Result<ProgramId, StorageError> {
    Ok(ProgramId::new(i64_to_u64("program_id", v)?))
}

pub(crate) fn exercise_id_from_i64(v: i64) -> Result<ExerciseId, StorageError> {
    Ok(ExerciseId::new(i64_to_u64("exercise_id", v)?))
}

pub(crate) fn session_id_from_i64(v: i64) -> Result<SessionId, StorageError> {
    Ok(SessionId::new(i64_to_u64("session_id", v)?))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

pub(crate) fn parse_status(s: &str) -> Result<SessionStatus, StorageError> {
    SessionStatus::parse(s)
        .ok_or_else(|| StorageError::Serialization(format!("invalid status: {s}")))
}

/// Reads `id, name, equipment, body_part, target_muscle, rating`.
pub(crate) fn map_catalog_row(row: &SqliteRow) -> Result<CatalogExercise, StorageError> {
    Ok(CatalogExercise {
        id: exercise_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        name: row.try_get("name").map_err(ser)?,
        equipment: row.try_get("equipment").map_err(ser)?,
        body_part: row.try_get("body_part").map_err(ser)?,
        target_muscle: row.try_get("target_muscle").map_err(ser)?,
        rating: row.try_get("rating").map_err(ser)?,
    })
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<SessionRecord, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    Ok(SessionRecord {
        id: session_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        program_id: row
            .try_get::<Option<i64>, _>("program_id")
            .map_err(ser)?
            .map(program_id_from_i64)
            .transpose()?,
        name: row.try_get("name").map_err(ser)?,
        status: parse_status(&status)?,
        started_at: row.try_get("started_at").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

/// Reads `exercise_id, exercise_name, weight, reps, created_at`.
pub(crate) fn map_performance_row(row: &SqliteRow) -> Result<SetPerformance, StorageError> {
    let performed_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    Ok(SetPerformance {
        exercise_id: exercise_id_from_i64(row.try_get::<i64, _>("exercise_id").map_err(ser)?)?,
        exercise_name: row.try_get("exercise_name").map_err(ser)?,
        weight: row.try_get("weight").map_err(ser)?,
        reps: u32_from_i64("reps", row.try_get::<i64, _>("reps").map_err(ser)?)?,
        performed_at,
    })
}

/// Profile goals are stored as a comma separated list of wire names.
pub(crate) fn goals_to_text(goals: &[FitnessGoal]) -> String {
    goals
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn goals_from_text(text: &str) -> Result<Vec<FitnessGoal>, StorageError> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<FitnessGoal>().map_err(ser))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goals_round_trip_through_text() {
        let goals = vec![FitnessGoal::Strength, FitnessGoal::LoseFat];
        let text = goals_to_text(&goals);
        assert_eq!(text, "strength,lose_fat");
        assert_eq!(goals_from_text(&text).unwrap(), goals);
        assert!(goals_from_text("").unwrap().is_empty());
    }

    #[test]
    fn unknown_status_is_a_serialization_error() {
        assert!(matches!(
            parse_status("paused"),
            Err(StorageError::Serialization(_))
        ));
    }
}
