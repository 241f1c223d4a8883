use std::sync::Arc;

use dreppy_core::coaching::{FallbackInput, TimeOfDay, TipMode, TrainingGoal, fallback_tip};
use dreppy_core::model::SetDifficulty;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::{ChatMessage, CompletionClient, CompletionRequest};

/// Everything the coach gets to see for one tip.
///
/// Field names follow the HTTP contract (camelCase); absent fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TipRequest {
    pub exercise_name: String,
    pub muscle_group: String,
    pub current_weight: f64,
    pub current_reps: u32,
    pub last_weight: f64,
    pub last_reps: u32,
    pub pr_weight: f64,
    pub pr_reps: u32,
    pub training_goal: TrainingGoal,
    pub previous_tip: Option<String>,
    pub previous_weight: Option<f64>,
    pub previous_reps: Option<u32>,
    pub is_resting: bool,
    pub rest_time_left: Option<u32>,
    pub current_set: Option<u32>,
    pub total_sets: Option<u32>,
    pub last_set_difficulty: Option<SetDifficulty>,
    pub time_of_day: Option<TimeOfDay>,
    pub workout_duration: Option<u32>,
    pub total_sets_completed: Option<u32>,
    pub tip_mode: TipMode,
}

impl TipRequest {
    /// Input for the deterministic fallback table.
    #[must_use]
    pub fn fallback_input(&self) -> FallbackInput {
        FallbackInput {
            goal: self.training_goal,
            current_weight: self.current_weight,
            previous_weight: self.previous_weight.unwrap_or(0.0),
            pr_weight: self.pr_weight,
            is_resting: self.is_resting,
            difficulty: self.last_set_difficulty,
            mode: self.tip_mode,
        }
    }
}

/// Token budget and temperature per tip mode.
#[must_use]
pub fn tip_budget(mode: TipMode) -> (u32, f32) {
    match mode {
        TipMode::Motivation => (40, 0.9),
        TipMode::Quick | TipMode::Form => (50, 0.7),
    }
}

fn shout(difficulty: SetDifficulty) -> String {
    difficulty.as_str().to_uppercase()
}

/// Render the single user prompt sent to the model.
#[must_use]
pub fn build_prompt(req: &TipRequest) -> String {
    let name = &req.exercise_name;

    let mode_line = match req.tip_mode {
        TipMode::Quick => {
            "Give a SHORT, actionable tip (max 15 words). Focus on the immediate set.".to_owned()
        }
        TipMode::Form => format!(
            "Give a TECHNIQUE tip for {name}. Focus on body position, grip, range of motion, or common mistakes."
        ),
        TipMode::Motivation => {
            "Give a HYPE/MOTIVATIONAL message. Be energetic and encouraging! Use emojis. Get them fired up!"
                .to_owned()
        }
    };

    let goal_line = match req.training_goal {
        TrainingGoal::Strength => "User goal: STRENGTH (heavy weights, 1-6 reps, power focus).",
        TrainingGoal::Hypertrophy => {
            "User goal: HYPERTROPHY (8-15 reps, controlled tempo, mind-muscle connection)."
        }
    };

    let history_line = if req.last_weight > 0.0 {
        format!(
            "Last workout: {}kg × {}. PR: {}kg × {}.",
            req.last_weight, req.last_reps, req.pr_weight, req.pr_reps
        )
    } else {
        "First time doing this exercise.".to_owned()
    };

    let set_line = match (req.current_set, req.total_sets) {
        (Some(current), Some(total)) if current > 0 && total > 0 => {
            format!(" Set {current}/{total}.")
        }
        _ => String::new(),
    };
    let current_line = format!(
        "Current: {}kg × {} reps.{set_line}",
        req.current_weight, req.current_reps
    );

    let mut time_line = req
        .time_of_day
        .map(|t| match t {
            TimeOfDay::Morning => "Early workout - might need extra warm-up.",
            TimeOfDay::Afternoon => "Afternoon session - should be well warmed up.",
            TimeOfDay::Evening => "Evening workout - good energy levels expected.",
            TimeOfDay::Night => "Late night session - be mindful of fatigue.",
        })
        .unwrap_or_default()
        .to_owned();
    if let Some(minutes) = req.workout_duration.filter(|m| *m > 45) {
        time_line.push_str(&format!(" Been training {minutes} min - stay hydrated!"));
    }
    if let Some(sets) = req.total_sets_completed.filter(|s| *s > 12) {
        time_line.push_str(&format!(" {sets} sets done - you're crushing it!"));
    }

    let difficulty_line = match (req.last_set_difficulty, req.current_set) {
        (Some(d), Some(set)) if !req.is_resting && set > 1 => {
            format!("Previous set felt: {}.", shout(d))
        }
        _ => String::new(),
    };

    let rest_line = match req.rest_time_left {
        Some(left) if req.is_resting => {
            let felt = req
                .last_set_difficulty
                .map(|d| format!(" Last set felt: {}.", shout(d)))
                .unwrap_or_default();
            format!("REST PERIOD: {}:{:02} left.{felt}", left / 60, left % 60)
        }
        _ => String::new(),
    };

    let conversation_line = match (&req.previous_tip, req.previous_weight) {
        (Some(tip), Some(previous))
            if !req.is_resting && (req.current_weight - previous).abs() > f64::EPSILON =>
        {
            let direction = if req.current_weight > previous {
                "INCREASED"
            } else {
                "DECREASED"
            };
            format!(
                "Previous tip: \"{tip}\" at {previous}kg. User {direction} to {}kg.",
                req.current_weight
            )
        }
        _ => String::new(),
    };

    let focus = if req.is_resting {
        "RESTING: Suggest weight adjustment based on difficulty. \"Easy\" = add weight. \"Hard\" = maybe drop. \"Normal\" = maintain.".to_owned()
    } else {
        match req.tip_mode {
            TipMode::Form => format!(
                "FORM FOCUS: Give specific technique cues for {name} (e.g., \"drive through heels\", \"squeeze at top\", \"keep elbows tucked\")."
            ),
            TipMode::Motivation => "HYPE MODE: Be enthusiastic! Use motivational language. Examples: \"Let's GO! 🔥\", \"You've got this!\", \"BEAST MODE! 💪\"".to_owned(),
            TipMode::Quick => {
                "If they followed your previous advice, acknowledge it! At PR? Extra encouragement."
                    .to_owned()
            }
        }
    };

    format!(
        "You are a gym coach. {mode_line}\n\n{goal_line}\n{history_line}\n{current_line}\n{time_line}\n{difficulty_line}\n{rest_line}\n{conversation_line}\n\n{focus}\n\nRespond with ONLY the tip. No quotes. Keep it concise."
    )
}

/// Produces coaching tips; never fails.
#[derive(Clone)]
pub struct CoachingService {
    client: Arc<dyn CompletionClient>,
}

impl CoachingService {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Ask the model for a tip, falling back to the canned table when the
    /// call fails or returns nothing.
    pub async fn tip(&self, req: &TipRequest) -> String {
        let (max_tokens, temperature) = tip_budget(req.tip_mode);
        let request = CompletionRequest {
            messages: vec![ChatMessage::user(build_prompt(req))],
            max_tokens,
            temperature,
        };

        match self.client.complete(request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => fallback_tip(&req.fallback_input()).to_owned(),
            Err(err) => {
                warn!(error = %err, exercise = %req.exercise_name, "coaching tip fell back");
                fallback_tip(&req.fallback_input()).to_owned()
            }
        }
    }
}
