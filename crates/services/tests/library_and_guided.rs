use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dreppy_core::model::{CatalogExercise, ExerciseId};
use dreppy_core::time::fixed_now;
use services::ai::{ChatRole, CompletionClient, CompletionRequest};
use services::program_service::{LIBRARY_LIMIT, SEARCH_LIMIT};
use services::{AiError, Clock, GuidedRequest, LibraryQuery, ProgramService, WorkoutGenerator};
use storage::repository::{ExerciseCatalogRepository, InMemoryRepository};

struct Recording {
    reply: String,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl Recording {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn user_prompt(&self) -> String {
        let seen = self.seen.lock().unwrap();
        let request = seen.last().unwrap();
        request
            .messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.clone())
            .unwrap()
    }
}

#[async_trait]
impl CompletionClient for Recording {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        self.seen.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

fn row(id: u64, name: &str, body_part: &str, equipment: &str, rating: f64) -> CatalogExercise {
    CatalogExercise {
        id: ExerciseId::new(id),
        name: name.into(),
        equipment: Some(equipment.into()),
        body_part: Some(body_part.into()),
        target_muscle: None,
        rating,
    }
}

/// 60 curl rows rated 1.0..=6.9 plus a few distinct lifts.
async fn library() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    for i in 0..60u32 {
        let rating = 1.0 + f64::from(i) / 10.0;
        repo.upsert_exercise(&row(
            100 + u64::from(i),
            &format!("Curl Variation {i}"),
            "Arms",
            "Dumbbell",
            rating,
        ))
        .await
        .unwrap();
    }
    for exercise in [
        row(1, "Barbell Bench Press", "Chest", "Barbell", 9.5),
        row(2, "Dumbbell Bench Press", "Chest", "Dumbbell", 8.7),
        row(3, "Barbell Back Squat", "Legs", "Barbell", 9.6),
        row(4, "Cable Fly", "Chest", "Cable", 7.9),
    ] {
        repo.upsert_exercise(&exercise).await.unwrap();
    }
    repo
}

fn program_service(repo: &Arc<InMemoryRepository>) -> ProgramService {
    ProgramService::new(Clock::fixed(fixed_now()), repo.clone(), repo.clone())
}

fn ratings_descend(hits: &[CatalogExercise]) -> bool {
    hits.windows(2).all(|pair| pair[0].rating >= pair[1].rating)
}

#[tokio::test]
async fn search_needs_two_characters() {
    let repo = library().await;
    let programs = program_service(&repo);

    assert!(programs.search_exercises("").await.unwrap().is_empty());
    assert!(programs.search_exercises("b").await.unwrap().is_empty());

    let hits = programs.search_exercises("fl").await.unwrap();
    let ids: Vec<ExerciseId> = hits.iter().map(|e| e.id).collect();
    assert_eq!(ids, [ExerciseId::new(4)]);
}

#[tokio::test]
async fn search_caps_hits_and_ranks_by_rating() {
    let repo = library().await;
    let programs = program_service(&repo);

    let hits = programs.search_exercises("curl").await.unwrap();
    assert_eq!(hits.len(), SEARCH_LIMIT);
    assert!(ratings_descend(&hits));
    assert_eq!(hits[0].name, "Curl Variation 59");

    let mixed_case = programs.search_exercises("BENCH").await.unwrap();
    assert_eq!(mixed_case[0].name, "Barbell Bench Press");
    assert_eq!(mixed_case[1].name, "Dumbbell Bench Press");
}

#[tokio::test]
async fn library_browse_caps_rows_and_applies_filters() {
    let repo = library().await;
    let programs = program_service(&repo);

    let everything = programs
        .browse_library(&LibraryQuery::default())
        .await
        .unwrap();
    assert_eq!(everything.len(), LIBRARY_LIMIT);
    assert!(ratings_descend(&everything));
    assert_eq!(everything[0].name, "Barbell Back Squat");

    let chest = programs
        .browse_library(&LibraryQuery {
            search: "  ".into(),
            body_part: Some("Chest".into()),
            equipment: None,
        })
        .await
        .unwrap();
    let names: Vec<&str> = chest.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        ["Barbell Bench Press", "Dumbbell Bench Press", "Cable Fly"]
    );

    let chest_dumbbell = programs
        .browse_library(&LibraryQuery {
            search: String::new(),
            body_part: Some("Chest".into()),
            equipment: Some("Dumbbell".into()),
        })
        .await
        .unwrap();
    assert_eq!(chest_dumbbell.len(), 1);
    assert_eq!(chest_dumbbell[0].id, ExerciseId::new(2));

    let blank_filters = programs
        .browse_library(&LibraryQuery {
            search: "press".into(),
            body_part: Some(String::new()),
            equipment: Some(" ".into()),
        })
        .await
        .unwrap();
    assert_eq!(blank_filters.len(), 2);
}

#[tokio::test]
async fn guided_generation_builds_the_prompt_and_falls_back_on_name() {
    let repo = library().await;
    let client = Recording::new(
        r#"{"exercises":[{"name":"Barbell Bench Press","target_sets":4,"target_reps":6}]}"#,
    );
    let generator = WorkoutGenerator::new(client.clone(), repo);

    let request = GuidedRequest {
        goal: "Strength".into(),
        body_parts: vec!["Chest".into(), "Arms".into()],
        exercise_count: 12,
        notes: Some("  no machines ".into()),
    };
    let workout = generator.generate_guided(&request).await.unwrap();

    assert_eq!(workout.name, "Chest Strength Workout");
    assert_eq!(workout.exercises.len(), 1);
    assert_eq!(workout.exercises[0].name, "Barbell Bench Press");

    let prompt = client.user_prompt();
    assert!(prompt.contains("Create a Strength workout targeting Chest, Arms."));
    assert!(prompt.contains("Include 8 exercises."));
    assert!(prompt.ends_with("Additional requirements: no machines"));
}

#[tokio::test]
async fn guided_generation_keeps_a_model_name_and_skips_blank_notes() {
    let repo = library().await;
    let client = Recording::new(
        r#"{"name":"Leg Builder","exercises":[{"name":"back squat","target_sets":5,"target_reps":5}]}"#,
    );
    let generator = WorkoutGenerator::new(client.clone(), repo);

    let request = GuidedRequest {
        goal: "Hypertrophy".into(),
        body_parts: vec!["Legs".into()],
        exercise_count: 1,
        notes: Some("   ".into()),
    };
    let workout = generator.generate_guided(&request).await.unwrap();

    assert_eq!(workout.name, "Leg Builder");
    assert_eq!(workout.exercises[0].name, "Barbell Back Squat");
    let prompt = client.user_prompt();
    assert!(prompt.contains("Include 3 exercises."));
    assert!(!prompt.contains("Additional requirements"));
}
