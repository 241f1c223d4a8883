use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id INTEGER PRIMARY KEY,
            email TEXT,
            display_name TEXT NOT NULL,
            goals TEXT NOT NULL DEFAULT '',
            experience TEXT,
            training_days INTEGER NOT NULL CHECK (training_days BETWEEN 2 AND 6),
            updated_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS exercises (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            equipment TEXT,
            body_part TEXT,
            target_muscle TEXT,
            rating REAL NOT NULL DEFAULT 0
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS program_exercises (
            program_id INTEGER NOT NULL,
            exercise_id INTEGER NOT NULL,
            order_index INTEGER NOT NULL CHECK (order_index >= 0),
            target_sets INTEGER NOT NULL CHECK (target_sets > 0),
            target_reps INTEGER NOT NULL CHECK (target_reps > 0),
            rest_seconds INTEGER NOT NULL CHECK (rest_seconds >= 0),
            PRIMARY KEY (program_id, order_index),
            FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE CASCADE,
            FOREIGN KEY (exercise_id) REFERENCES exercises(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS workout_sessions (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            program_id INTEGER,
            name TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('in_progress', 'completed')),
            started_at TEXT NOT NULL,
            completed_at TEXT,
            FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE SET NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS session_exercises (
            id INTEGER PRIMARY KEY,
            session_id INTEGER NOT NULL,
            exercise_id INTEGER NOT NULL,
            order_index INTEGER NOT NULL CHECK (order_index >= 0),
            UNIQUE (session_id, exercise_id),
            FOREIGN KEY (session_id) REFERENCES workout_sessions(id) ON DELETE CASCADE,
            FOREIGN KEY (exercise_id) REFERENCES exercises(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS completed_sets (
            id INTEGER PRIMARY KEY,
            session_exercise_id INTEGER NOT NULL,
            set_number INTEGER NOT NULL CHECK (set_number > 0),
            reps INTEGER NOT NULL CHECK (reps >= 0),
            weight REAL NOT NULL CHECK (weight >= 0),
            difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'normal', 'hard')),
            created_at TEXT NOT NULL,
            FOREIGN KEY (session_exercise_id) REFERENCES session_exercises(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_exercises_rating
            ON exercises (rating DESC, id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_programs_user_updated
            ON programs (user_id, updated_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_workout_sessions_user_started
            ON workout_sessions (user_id, started_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_completed_sets_exercise_created
            ON completed_sets (session_exercise_id, created_at);
    ",
];

/// Runs the versioned migrations for the current schema.
///
/// Version 1 creates profiles, the exercise catalog, programs with their
/// ordered exercises, and the workout log (sessions, session exercises,
/// completed sets).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
