use chrono::Duration;
use dreppy_core::model::{
    CatalogExercise, CatalogFilter, ExerciseId, ExperienceLevel, FitnessGoal, Profile,
    ProgramExercise, SessionStatus, SetDifficulty, UserId,
};
use dreppy_core::time::fixed_now;
use storage::repository::{
    CompletedSetRecord, ExerciseCatalogRepository, HistoryRepository, NewProgramRecord,
    ProfileRecord, ProfileRepository, ProgramRepository, StorageError, WorkoutLogRepository,
};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn catalog(id: u64, name: &str, body_part: &str, equipment: &str, rating: f64) -> CatalogExercise {
    CatalogExercise {
        id: ExerciseId::new(id),
        name: name.into(),
        equipment: Some(equipment.into()),
        body_part: Some(body_part.into()),
        target_muscle: None,
        rating,
    }
}

fn set(n: u32, reps: u32, weight: f64, minutes: i64) -> CompletedSetRecord {
    CompletedSetRecord {
        set_number: n,
        reps,
        weight,
        difficulty: SetDifficulty::Normal,
        completed_at: fixed_now() + Duration::minutes(minutes),
    }
}

#[tokio::test]
async fn programs_keep_exercise_order_and_catalog_labels() {
    let repo = repo("memdb_programs").await;
    let bench = catalog(1, "Bench Press", "Chest", "Barbell", 9.0);
    let row = catalog(2, "Barbell Row", "Back", "Barbell", 8.5);
    repo.upsert_exercise(&bench).await.unwrap();
    repo.upsert_exercise(&row).await.unwrap();

    let mut first = ProgramExercise::from_catalog(&row);
    first.set_target_sets(4).unwrap();
    let id = repo
        .insert_program(NewProgramRecord {
            owner: UserId::new(7),
            name: "  Upper  ".into(),
            exercises: vec![first, ProgramExercise::from_catalog(&bench)],
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let program = repo.get_program(id).await.unwrap().expect("program");
    assert_eq!(program.name(), "Upper");
    assert_eq!(program.owner(), UserId::new(7));
    let names: Vec<&str> = program.exercises().iter().map(ProgramExercise::name).collect();
    assert_eq!(names, ["Barbell Row", "Bench Press"]);
    assert_eq!(program.exercises()[0].target_sets(), 4);
    assert_eq!(program.exercises()[0].muscle_group(), "Back");

    assert_eq!(repo.list_programs(UserId::new(7), 10).await.unwrap().len(), 1);
    assert!(repo.list_programs(UserId::new(8), 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_program_keeps_its_sessions() {
    let repo = repo("memdb_delete_program").await;
    let bench = catalog(1, "Bench Press", "Chest", "Barbell", 9.0);
    repo.upsert_exercise(&bench).await.unwrap();
    let owner = UserId::new(1);
    let program = repo
        .insert_program(NewProgramRecord {
            owner,
            name: "Push".into(),
            exercises: vec![ProgramExercise::from_catalog(&bench)],
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    repo.start_session(owner, program, "Push", fixed_now())
        .await
        .unwrap();

    assert!(matches!(
        repo.delete_program(UserId::new(2), program).await,
        Err(StorageError::NotFound)
    ));
    repo.delete_program(owner, program).await.unwrap();

    let sessions = repo.list_sessions(owner, None).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].program_id, None);
}

#[tokio::test]
async fn catalog_search_filters_and_orders_by_rating() {
    let repo = repo("memdb_catalog").await;
    for exercise in [
        catalog(1, "Barbell Bench Press", "Chest", "Barbell", 9.1),
        catalog(2, "Dumbbell Bench Press", "Chest", "Dumbbell", 8.7),
        catalog(3, "Barbell Squat", "Legs", "Barbell", 9.5),
    ] {
        repo.upsert_exercise(&exercise).await.unwrap();
    }

    let top = repo.top_rated(2).await.unwrap();
    assert_eq!(top[0].name, "Barbell Squat");
    assert_eq!(top.len(), 2);

    let hits = repo
        .search(&CatalogFilter {
            name_contains: Some("bench".into()),
            body_part: None,
            equipment: Some("Dumbbell".into()),
            limit: 50,
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, ExerciseId::new(2));

    let mut renamed = catalog(3, "Back Squat", "Legs", "Barbell", 9.5);
    renamed.target_muscle = Some("Quads".into());
    repo.upsert_exercise(&renamed).await.unwrap();
    let fetched = repo.get_exercise(ExerciseId::new(3)).await.unwrap().unwrap();
    assert_eq!(fetched, renamed);
}

#[tokio::test]
async fn workout_log_feeds_history_newest_first() {
    let repo = repo("memdb_workout_log").await;
    let bench = catalog(1, "Bench Press", "Chest", "Barbell", 9.0);
    repo.upsert_exercise(&bench).await.unwrap();
    let owner = UserId::new(3);
    let program = repo
        .insert_program(NewProgramRecord {
            owner,
            name: "Push".into(),
            exercises: vec![ProgramExercise::from_catalog(&bench)],
            created_at: fixed_now(),
        })
        .await
        .unwrap();

    let session = repo
        .start_session(owner, program, "Push", fixed_now())
        .await
        .unwrap();
    let slot = repo
        .ensure_session_exercise(session, bench.id, 0)
        .await
        .unwrap();
    assert_eq!(
        repo.ensure_session_exercise(session, bench.id, 0)
            .await
            .unwrap(),
        slot
    );

    repo.append_set(slot, &set(1, 8, 60.0, 1)).await.unwrap();
    repo.append_set(slot, &set(2, 6, 70.0, 4)).await.unwrap();
    repo.complete_session(session, fixed_now() + Duration::minutes(45))
        .await
        .unwrap();

    let history = repo.sets_for_exercise(owner, bench.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!((history[0].weight - 70.0).abs() < f64::EPSILON);
    assert_eq!(history[0].exercise_name, "Bench Press");

    let recent = repo.recent_sets(owner, 1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert!(repo.recent_sets(UserId::new(99), 10).await.unwrap().is_empty());

    let sessions = repo.list_sessions(owner, Some(5)).await.unwrap();
    assert_eq!(sessions[0].status, SessionStatus::Completed);
    assert_eq!(sessions[0].duration_label(), "45 min");
}

#[tokio::test]
async fn unknown_session_rows_are_not_found() {
    let repo = repo("memdb_unknown_session").await;
    assert!(matches!(
        repo.complete_session(dreppy_core::model::SessionId::new(404), fixed_now())
            .await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.append_set(storage::repository::SessionExerciseId(404), &set(1, 5, 20.0, 0))
            .await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn profiles_upsert_and_read_back() {
    let repo = repo("memdb_profiles").await;
    let user = UserId::new(11);
    let profile = Profile::new(
        user,
        "Alex",
        vec![FitnessGoal::Strength, FitnessGoal::Endurance],
        Some(ExperienceLevel::Intermediate),
        4,
    )
    .unwrap();
    let record = ProfileRecord {
        profile,
        email: Some("alex@example.com".into()),
        updated_at: fixed_now(),
    };
    repo.upsert_profile(&record).await.unwrap();
    assert_eq!(repo.get_profile(user).await.unwrap(), Some(record.clone()));

    let changed = ProfileRecord {
        profile: Profile::new(user, "Alexandra", vec![], None, 3).unwrap(),
        email: None,
        updated_at: fixed_now() + Duration::days(1),
    };
    repo.upsert_profile(&changed).await.unwrap();
    assert_eq!(repo.get_profile(user).await.unwrap(), Some(changed));
    assert_eq!(repo.get_profile(UserId::new(12)).await.unwrap(), None);
}
