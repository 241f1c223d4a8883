use std::fmt;

use chrono::{DateTime, Duration, Utc};
use dreppy_core::model::{
    CatalogExercise, ExerciseId, ExperienceLevel, FitnessGoal, Profile, ProgramExercise,
    SetDifficulty, UserId,
};
use storage::repository::{CompletedSetRecord, NewProgramRecord, ProfileRecord, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    sessions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidSessions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("DREPPY_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user_id = std::env::var("DREPPY_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut sessions = std::env::var("DREPPY_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user-id" => {
                    let value = require_value(&mut args, "--user-id")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            sessions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user-id <id>            Owner of the seeded profile and program (default: 1)");
    eprintln!("  --sessions <n>            Number of completed sessions to log (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  DREPPY_DB_URL, DREPPY_USER_ID, DREPPY_SESSIONS");
}

fn sample_catalog() -> Vec<CatalogExercise> {
    let rows: [(u64, &str, &str, &str, &str, f64); 8] = [
        (1, "Barbell Bench Press", "Barbell", "Chest", "Pectorals", 9.4),
        (2, "Barbell Back Squat", "Barbell", "Legs", "Quadriceps", 9.6),
        (3, "Conventional Deadlift", "Barbell", "Back", "Hamstrings", 9.5),
        (4, "Overhead Press", "Barbell", "Shoulders", "Deltoids", 9.0),
        (5, "Pull-Up", "Body Weight", "Back", "Lats", 9.2),
        (6, "Dumbbell Incline Press", "Dumbbell", "Chest", "Upper Pectorals", 8.7),
        (7, "Romanian Deadlift", "Barbell", "Legs", "Hamstrings", 8.9),
        (8, "Cable Tricep Pushdown", "Cable", "Arms", "Triceps", 8.1),
    ];
    rows.into_iter()
        .map(|(id, name, equipment, body_part, target, rating)| CatalogExercise {
            id: ExerciseId::new(id),
            name: name.into(),
            equipment: Some(equipment.into()),
            body_part: Some(body_part.into()),
            target_muscle: Some(target.into()),
            rating,
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let catalog = sample_catalog();
    for exercise in &catalog {
        storage.catalog.upsert_exercise(exercise).await?;
    }

    let profile = Profile::new(
        args.user_id,
        "Demo",
        vec![FitnessGoal::Strength, FitnessGoal::Muscle],
        Some(ExperienceLevel::Intermediate),
        4,
    )?;
    storage
        .profiles
        .upsert_profile(&ProfileRecord {
            profile,
            email: Some("demo@example.com".into()),
            updated_at: now,
        })
        .await?;

    let exercises: Vec<ProgramExercise> = catalog
        .iter()
        .take(4)
        .map(ProgramExercise::from_catalog)
        .collect();
    let program_id = storage
        .programs
        .insert_program(NewProgramRecord {
            owner: args.user_id,
            name: "Full Body Strength".into(),
            exercises: exercises.clone(),
            created_at: now,
        })
        .await?;

    for i in 0..args.sessions {
        let days_ago = i64::from(args.sessions - i) * 2;
        let started_at = now - Duration::days(days_ago);
        let session = storage
            .workout_log
            .start_session(args.user_id, program_id, "Full Body Strength", started_at)
            .await?;

        let mut at = started_at;
        for (index, exercise) in exercises.iter().enumerate() {
            let slot = storage
                .workout_log
                .ensure_session_exercise(session, exercise.exercise_id(), u32::try_from(index)?)
                .await?;
            let base = 40.0 + 10.0 * index as f64 + 2.5 * f64::from(i);
            for set_number in 1..=exercise.target_sets() {
                at += Duration::minutes(3);
                storage
                    .workout_log
                    .append_set(
                        slot,
                        &CompletedSetRecord {
                            set_number,
                            reps: exercise.target_reps(),
                            weight: base,
                            difficulty: SetDifficulty::Normal,
                            completed_at: at,
                        },
                    )
                    .await?;
            }
        }
        storage.workout_log.complete_session(session, at).await?;
    }

    println!(
        "Seeded {} exercises, program {} and {} sessions for user {} into {}",
        catalog.len(),
        program_id,
        args.sessions,
        args.user_id,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
