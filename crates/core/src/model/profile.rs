use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::coaching::TrainingGoal;
use crate::model::ids::UserId;

pub const MIN_TRAINING_DAYS: u8 = 2;
pub const MAX_TRAINING_DAYS: u8 = 6;
pub const DEFAULT_TRAINING_DAYS: u8 = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileValidationError {
    #[error("display name must be at least 2 characters")]
    NameTooShort,

    #[error("training days must be between 2 and 6, got {0}")]
    InvalidTrainingDays(u8),

    #[error("unknown fitness goal: {0}")]
    UnknownGoal(String),

    #[error("unknown experience level: {0}")]
    UnknownExperience(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    Strength,
    Muscle,
    Endurance,
    LoseFat,
    General,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 5] = [
        FitnessGoal::Strength,
        FitnessGoal::Muscle,
        FitnessGoal::Endurance,
        FitnessGoal::LoseFat,
        FitnessGoal::General,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FitnessGoal::Strength => "strength",
            FitnessGoal::Muscle => "muscle",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::LoseFat => "lose_fat",
            FitnessGoal::General => "general",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FitnessGoal::Strength => "Build Strength",
            FitnessGoal::Muscle => "Build Muscle",
            FitnessGoal::Endurance => "Improve Endurance",
            FitnessGoal::LoseFat => "Lose Fat",
            FitnessGoal::General => "General Fitness",
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitnessGoal {
    type Err = ProfileValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| ProfileValidationError::UnknownGoal(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = ProfileValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(ProfileValidationError::UnknownExperience(other.to_owned())),
        }
    }
}

/// User profile captured during onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    user_id: UserId,
    display_name: String,
    goals: Vec<FitnessGoal>,
    experience: Option<ExperienceLevel>,
    training_days: u8,
}

impl Profile {
    /// # Errors
    ///
    /// Returns `ProfileValidationError` for a name shorter than two
    /// characters or training days outside 2..=6.
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        goals: Vec<FitnessGoal>,
        experience: Option<ExperienceLevel>,
        training_days: u8,
    ) -> Result<Self, ProfileValidationError> {
        let display_name = display_name.into().trim().to_owned();
        if display_name.chars().count() < 2 {
            return Err(ProfileValidationError::NameTooShort);
        }
        if !(MIN_TRAINING_DAYS..=MAX_TRAINING_DAYS).contains(&training_days) {
            return Err(ProfileValidationError::InvalidTrainingDays(training_days));
        }

        let mut unique = Vec::with_capacity(goals.len());
        for goal in goals {
            if !unique.contains(&goal) {
                unique.push(goal);
            }
        }

        Ok(Self {
            user_id,
            display_name,
            goals: unique,
            experience,
            training_days,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn goals(&self) -> &[FitnessGoal] {
        &self.goals
    }

    #[must_use]
    pub fn experience(&self) -> Option<ExperienceLevel> {
        self.experience
    }

    #[must_use]
    pub fn training_days(&self) -> u8 {
        self.training_days
    }

    /// `Strength` when the user picked the strength goal, otherwise
    /// `Hypertrophy`.
    #[must_use]
    pub fn training_goal(&self) -> TrainingGoal {
        if self.goals.contains(&FitnessGoal::Strength) {
            TrainingGoal::Strength
        } else {
            TrainingGoal::Hypertrophy
        }
    }
}

/// Default display name from an email: local part, first letter upper-cased.
#[must_use]
pub fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_from_email_capitalises_local_part() {
        assert_eq!(name_from_email("jordan.lee@example.com"), "Jordan.lee");
        assert_eq!(name_from_email(""), "");
    }

    #[test]
    fn strength_goal_maps_to_strength_training() {
        let profile = Profile::new(
            UserId::new(1),
            "Sam",
            vec![FitnessGoal::Muscle, FitnessGoal::Strength],
            None,
            4,
        )
        .unwrap();
        assert_eq!(profile.training_goal(), TrainingGoal::Strength);
    }

    #[test]
    fn other_goals_map_to_hypertrophy() {
        let profile =
            Profile::new(UserId::new(1), "Sam", vec![FitnessGoal::LoseFat], None, 3).unwrap();
        assert_eq!(profile.training_goal(), TrainingGoal::Hypertrophy);
    }

    #[test]
    fn training_days_outside_range_are_rejected() {
        let err = Profile::new(UserId::new(1), "Sam", vec![], None, 7).unwrap_err();
        assert_eq!(err, ProfileValidationError::InvalidTrainingDays(7));
    }

    #[test]
    fn goals_parse_from_wire_names() {
        assert_eq!("lose_fat".parse::<FitnessGoal>().unwrap(), FitnessGoal::LoseFat);
        assert!("bulk".parse::<FitnessGoal>().is_err());
    }
}
