//! Deterministic coaching vocabulary: training goals, tip modes, time-of-day
//! buckets and the fallback tip table used when no model is reachable.

use serde::{Deserialize, Serialize};

use crate::model::SetDifficulty;

/// Tip returned when a request cannot even be read.
pub const GENERIC_TIP: &str = "Focus on form and controlled movement.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingGoal {
    Strength,
    #[default]
    Hypertrophy,
}

impl TrainingGoal {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrainingGoal::Strength => "strength",
            TrainingGoal::Hypertrophy => "hypertrophy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipMode {
    #[default]
    Quick,
    Form,
    Motivation,
}

impl TipMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TipMode::Quick => "quick",
            TipMode::Form => "form",
            TipMode::Motivation => "motivation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// 05-11 morning, 12-16 afternoon, 17-20 evening, everything else night.
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

/// The subset of a tip request the fallback table looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FallbackInput {
    pub goal: TrainingGoal,
    pub current_weight: f64,
    pub previous_weight: f64,
    pub pr_weight: f64,
    pub is_resting: bool,
    pub difficulty: Option<SetDifficulty>,
    pub mode: TipMode,
}

/// Pick a canned tip. Never empty.
#[must_use]
pub fn fallback_tip(input: &FallbackInput) -> &'static str {
    match input.mode {
        TipMode::Motivation => return "💪 You've got this! Give it everything! 🔥",
        TipMode::Form => return "Control the weight through full range of motion.",
        TipMode::Quick => {}
    }

    if input.is_resting {
        return match input.difficulty {
            Some(SetDifficulty::Easy) => "💪 Easy set! Add some weight next round.",
            Some(SetDifficulty::Hard) => "😤 Tough one! Rest up, consider dropping weight.",
            _ => "⏱️ Rest up! Same weight, focus on form.",
        };
    }

    let at_pr = input.pr_weight > 0.0 && input.current_weight >= input.pr_weight;
    let bumped = input.previous_weight > 0.0 && input.current_weight > input.previous_weight;

    match (input.goal, at_pr, bumped) {
        (TrainingGoal::Strength, true, _) => "🔥 PR attempt! Brace hard, explode up!",
        (TrainingGoal::Strength, false, true) => "💪 Weight bump! Let's crush it!",
        (TrainingGoal::Strength, false, false) => "Power and lockout. You've got this.",
        (TrainingGoal::Hypertrophy, true, _) => "🏆 At your max! Control every rep.",
        (TrainingGoal::Hypertrophy, false, true) => "👍 Good weight increase! Keep tempo slow.",
        (TrainingGoal::Hypertrophy, false, false) => "Slow eccentric, squeeze at peak.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strength(current: f64, previous: f64, pr: f64) -> FallbackInput {
        FallbackInput {
            goal: TrainingGoal::Strength,
            current_weight: current,
            previous_weight: previous,
            pr_weight: pr,
            ..FallbackInput::default()
        }
    }

    #[test]
    fn strength_at_pr_acknowledges_record() {
        assert_eq!(
            fallback_tip(&strength(100.0, 90.0, 100.0)),
            "🔥 PR attempt! Brace hard, explode up!"
        );
    }

    #[test]
    fn zero_pr_is_not_a_record() {
        assert_eq!(
            fallback_tip(&strength(0.0, 0.0, 0.0)),
            "Power and lockout. You've got this."
        );
    }

    #[test]
    fn weight_bump_needs_previous_weight() {
        assert_eq!(
            fallback_tip(&strength(85.0, 80.0, 100.0)),
            "💪 Weight bump! Let's crush it!"
        );
    }

    #[test]
    fn resting_uses_difficulty() {
        let mut input = strength(100.0, 90.0, 100.0);
        input.is_resting = true;
        input.difficulty = Some(SetDifficulty::Hard);
        assert_eq!(
            fallback_tip(&input),
            "😤 Tough one! Rest up, consider dropping weight."
        );
        input.difficulty = None;
        assert_eq!(fallback_tip(&input), "⏱️ Rest up! Same weight, focus on form.");
    }

    #[test]
    fn mode_wins_over_everything() {
        let mut input = strength(100.0, 90.0, 100.0);
        input.is_resting = true;
        input.mode = TipMode::Form;
        assert_eq!(
            fallback_tip(&input),
            "Control the weight through full range of motion."
        );
    }

    #[test]
    fn hypertrophy_uses_tempo_cues() {
        let input = FallbackInput {
            current_weight: 20.0,
            ..FallbackInput::default()
        };
        assert_eq!(fallback_tip(&input), "Slow eccentric, squeeze at peak.");
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(13), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(2), TimeOfDay::Night);
    }
}
