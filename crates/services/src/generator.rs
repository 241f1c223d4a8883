//! LLM-assisted program generation.
//!
//! The model is shown the highest-rated part of the exercise library and
//! asked for JSON. Its suggestions are then matched back onto catalog rows,
//! so only exercises that actually exist survive.

use std::sync::Arc;

use dreppy_core::model::{
    CatalogExercise, DEFAULT_TARGET_REPS, DEFAULT_TARGET_SETS, ExerciseId, GENERAL_MUSCLE_GROUP,
    ProgramError, ProgramExercise,
};
use serde::{Deserialize, Serialize};
use storage::repository::ExerciseCatalogRepository;
use strsim::jaro_winkler;
use tracing::{info, warn};

use crate::ai::{ChatMessage, CompletionClient, CompletionRequest};
use crate::error::GenerationError;

/// Catalog rows embedded in the system prompt.
pub const CATALOG_PROMPT_LIMIT: u32 = 200;

pub const MIN_EXERCISE_COUNT: u8 = 3;
pub const MAX_EXERCISE_COUNT: u8 = 8;

const SIMILARITY_THRESHOLD: f64 = 0.85;
const SIMILARITY_MARGIN: f64 = 0.02;

/// Answers of the guided "create with AI" flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidedRequest {
    pub goal: String,
    pub body_parts: Vec<String>,
    pub exercise_count: u8,
    pub notes: Option<String>,
}

impl GuidedRequest {
    /// Free-form prompt for the generator; the count is clamped to 3..=8.
    #[must_use]
    pub fn prompt(&self) -> String {
        let count = self
            .exercise_count
            .clamp(MIN_EXERCISE_COUNT, MAX_EXERCISE_COUNT);
        let mut prompt = format!(
            "Create a {} workout targeting {}.\nInclude {count} exercises.",
            self.goal,
            self.body_parts.join(", ")
        );
        if let Some(notes) = self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            prompt.push_str("\nAdditional requirements: ");
            prompt.push_str(notes);
        }
        prompt
    }

    /// Name used when the model does not provide one.
    #[must_use]
    pub fn fallback_name(&self) -> String {
        let part = self.body_parts.first().map_or("", String::as_str);
        format!("{part} {} Workout", self.goal).trim().to_owned()
    }
}

#[must_use]
pub fn alternative_prompt(exercise_name: &str, body_part: &str) -> String {
    format!(
        "Find an alternative exercise to \"{exercise_name}\" that targets the same muscle ({body_part}).\nPick just 1 exercise that is different but similar in function."
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedExercise {
    pub id: ExerciseId,
    pub name: String,
    pub equipment: Option<String>,
    pub body_part: Option<String>,
    pub target_sets: u32,
    pub target_reps: u32,
}

impl GeneratedExercise {
    /// # Errors
    ///
    /// Returns `ProgramError` if the targets are invalid.
    pub fn to_program_exercise(&self, rest_seconds: u32) -> Result<ProgramExercise, ProgramError> {
        let muscle_group = self
            .body_part
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(GENERAL_MUSCLE_GROUP);
        ProgramExercise::new(
            self.id,
            self.name.clone(),
            muscle_group,
            self.target_sets,
            self.target_reps,
            rest_seconds,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedWorkout {
    pub name: String,
    pub exercises: Vec<GeneratedExercise>,
}

#[derive(Debug, Deserialize)]
struct RawWorkout {
    #[serde(default)]
    name: Option<String>,
    exercises: Vec<RawExercise>,
}

#[derive(Debug, Deserialize)]
struct RawExercise {
    name: String,
    #[serde(default)]
    target_sets: Option<u32>,
    #[serde(default)]
    target_reps: Option<u32>,
}

/// Drop Markdown code fences the model likes to wrap JSON in.
#[must_use]
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn system_prompt(catalog: &[CatalogExercise]) -> String {
    let list = catalog
        .iter()
        .map(CatalogExercise::prompt_line)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are a fitness expert creating workout programs. Generate a workout based on the user's request.

Available exercises (pick from these EXACTLY):
{list}

Return a JSON object with:
{{
  "name": "Workout name",
  "exercises": [
    {{"name": "Exact exercise name from list", "target_sets": 3, "target_reps": 10}},
    ...
  ]
}}

Pick 4-8 exercises that match the user's goals. Use EXACT exercise names from the list above.
Only return the JSON, no other text."#
    )
}

/// Map a suggested exercise name onto the catalog.
///
/// Tried in order: case-insensitive equality, a catalog name containing the
/// suggestion (ignoring any parenthesised suffix), the suggestion containing
/// a catalog name, then the single clearly best Jaro-Winkler match.
#[must_use]
pub fn match_exercise<'a>(
    catalog: &'a [CatalogExercise],
    suggestion: &str,
) -> Option<&'a CatalogExercise> {
    let wanted = suggestion.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    let stem = wanted.split('(').next().unwrap_or("").trim();

    let lowered: Vec<String> = catalog.iter().map(|e| e.name.trim().to_lowercase()).collect();

    if let Some(i) = lowered.iter().position(|n| *n == wanted) {
        return catalog.get(i);
    }
    if !stem.is_empty() {
        if let Some(i) = lowered.iter().position(|n| n.contains(stem)) {
            return catalog.get(i);
        }
    }
    if let Some(i) = lowered
        .iter()
        .position(|n| !n.is_empty() && wanted.contains(n.as_str()))
    {
        return catalog.get(i);
    }

    let mut best: Option<(usize, f64)> = None;
    let mut runner_up = 0.0_f64;
    for (i, name) in lowered.iter().enumerate() {
        let score = jaro_winkler(&wanted, name);
        match best {
            Some((_, top)) if score <= top => runner_up = runner_up.max(score),
            Some((_, top)) => {
                runner_up = top;
                best = Some((i, score));
            }
            None => best = Some((i, score)),
        }
    }
    best.filter(|(_, score)| *score >= SIMILARITY_THRESHOLD && score - runner_up >= SIMILARITY_MARGIN)
        .and_then(|(i, _)| catalog.get(i))
}

/// Parse model output and keep only suggestions that match the catalog.
///
/// # Errors
///
/// Returns `GenerationError::Parse` when the content is not the expected JSON.
pub fn parse_generated(
    content: &str,
    catalog: &[CatalogExercise],
) -> Result<GeneratedWorkout, GenerationError> {
    let raw: RawWorkout = serde_json::from_str(strip_code_fences(content))
        .map_err(|e| GenerationError::Parse(e.to_string()))?;

    let exercises = raw
        .exercises
        .iter()
        .filter_map(|suggested| {
            let Some(hit) = match_exercise(catalog, &suggested.name) else {
                warn!(suggestion = %suggested.name, "generated exercise not in catalog");
                return None;
            };
            Some(GeneratedExercise {
                id: hit.id,
                name: hit.name.clone(),
                equipment: hit.equipment.clone(),
                body_part: hit.body_part.clone(),
                target_sets: suggested
                    .target_sets
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_TARGET_SETS),
                target_reps: suggested
                    .target_reps
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_TARGET_REPS),
            })
        })
        .collect();

    Ok(GeneratedWorkout {
        name: raw.name.unwrap_or_default(),
        exercises,
    })
}

#[derive(Clone)]
pub struct WorkoutGenerator {
    client: Arc<dyn CompletionClient>,
    catalog: Arc<dyn ExerciseCatalogRepository>,
}

impl WorkoutGenerator {
    #[must_use]
    pub fn new(
        client: Arc<dyn CompletionClient>,
        catalog: Arc<dyn ExerciseCatalogRepository>,
    ) -> Self {
        Self { client, catalog }
    }

    /// Generate a workout for a free-form prompt.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::EmptyCatalog` without exercises to pick
    /// from, `GenerationError::Ai` on upstream failure and
    /// `GenerationError::Parse` for unusable output.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedWorkout, GenerationError> {
        let catalog = self.catalog.top_rated(CATALOG_PROMPT_LIMIT).await?;
        if catalog.is_empty() {
            return Err(GenerationError::EmptyCatalog);
        }

        let content = self
            .client
            .complete(CompletionRequest {
                messages: vec![
                    ChatMessage::system(system_prompt(&catalog)),
                    ChatMessage::user(prompt),
                ],
                max_tokens: 1000,
                temperature: 0.7,
            })
            .await?;

        let workout = parse_generated(&content, &catalog)?;
        info!(
            name = %workout.name,
            exercises = workout.exercises.len(),
            "generated workout"
        );
        Ok(workout)
    }

    /// # Errors
    ///
    /// See [`WorkoutGenerator::generate`].
    pub async fn generate_guided(
        &self,
        request: &GuidedRequest,
    ) -> Result<GeneratedWorkout, GenerationError> {
        let mut workout = self.generate(&request.prompt()).await?;
        if workout.name.trim().is_empty() {
            workout.name = request.fallback_name();
        }
        Ok(workout)
    }

    /// Ask for one replacement exercise; the original's targets and rest
    /// carry over.
    ///
    /// # Errors
    ///
    /// See [`WorkoutGenerator::generate`].
    pub async fn find_alternative(
        &self,
        original: &ProgramExercise,
    ) -> Result<Option<ProgramExercise>, GenerationError> {
        let prompt = alternative_prompt(original.name(), original.muscle_group());
        let workout = self.generate(&prompt).await?;
        let Some(first) = workout.exercises.into_iter().next() else {
            return Ok(None);
        };

        let replacement = GeneratedExercise {
            target_sets: original.target_sets(),
            target_reps: original.target_reps(),
            ..first
        };
        replacement
            .to_program_exercise(original.rest_seconds())
            .map(Some)
            .map_err(|e| GenerationError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, name: &str) -> CatalogExercise {
        CatalogExercise {
            id: ExerciseId::new(id),
            name: name.into(),
            equipment: Some("Barbell".into()),
            body_part: Some("Chest".into()),
            target_muscle: None,
            rating: 9.0,
        }
    }

    fn catalog() -> Vec<CatalogExercise> {
        vec![
            entry(1, "Barbell Bench Press"),
            entry(2, "Incline Dumbbell Press"),
            entry(3, "Cable Fly"),
        ]
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn matching_prefers_exact_then_containment() {
        let catalog = catalog();
        assert_eq!(match_exercise(&catalog, "cable fly").unwrap().id, ExerciseId::new(3));
        assert_eq!(
            match_exercise(&catalog, "Bench Press (barbell)").unwrap().id,
            ExerciseId::new(1)
        );
        assert_eq!(
            match_exercise(&catalog, "Low-to-high Cable Fly").unwrap().id,
            ExerciseId::new(3)
        );
    }

    #[test]
    fn matching_falls_back_to_similarity() {
        let catalog = catalog();
        assert_eq!(
            match_exercise(&catalog, "Incline Dumbell Pres").unwrap().id,
            ExerciseId::new(2)
        );
        assert!(match_exercise(&catalog, "Jump Rope").is_none());
    }

    #[test]
    fn parse_defaults_targets_and_drops_unknown_names() {
        let content = r#"```json
{"name":"Chest Day","exercises":[
  {"name":"Barbell Bench Press","target_sets":5,"target_reps":5},
  {"name":"Cable Fly"},
  {"name":"Underwater Basket Weaving","target_sets":3,"target_reps":10}
]}
```"#;
        let workout = parse_generated(content, &catalog()).unwrap();
        assert_eq!(workout.name, "Chest Day");
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].target_sets, 5);
        assert_eq!(workout.exercises[1].target_sets, DEFAULT_TARGET_SETS);
        assert_eq!(workout.exercises[1].target_reps, DEFAULT_TARGET_REPS);
    }

    #[test]
    fn unparseable_output_is_a_parse_error() {
        assert!(matches!(
            parse_generated("Here is your workout!", &catalog()),
            Err(GenerationError::Parse(_))
        ));
    }

    #[test]
    fn guided_prompt_clamps_count_and_appends_notes() {
        let request = GuidedRequest {
            goal: "strength".into(),
            body_parts: vec!["chest".into(), "back".into()],
            exercise_count: 12,
            notes: Some("no machines".into()),
        };
        assert_eq!(
            request.prompt(),
            "Create a strength workout targeting chest, back.\nInclude 8 exercises.\nAdditional requirements: no machines"
        );
        assert_eq!(request.fallback_name(), "chest strength Workout");
    }
}
