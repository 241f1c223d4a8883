use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetError {
    #[error("set number must be >= 1")]
    InvalidSetNumber,

    #[error("target reps must be > 0")]
    InvalidTargetReps,

    #[error("weight must be a finite, non-negative number")]
    InvalidWeight,

    #[error("set {set_number} is already completed")]
    AlreadyCompleted { set_number: u32 },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Subjective rating the user gives a set right after finishing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl SetDifficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SetDifficulty::Easy => "easy",
            SetDifficulty::Normal => "normal",
            SetDifficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for SetDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetDifficulty {
    type Err = SetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(SetError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── SET ───────────────────────────────────────────────────────────────────────
//

/// One planned or performed set inside a workout exercise.
///
/// A completed set always carries the reps and weight it was completed with,
/// and it never returns to the incomplete state.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    set_number: u32,
    target_reps: u32,
    completed_reps: Option<u32>,
    weight: Option<f64>,
    completed: bool,
    difficulty: Option<SetDifficulty>,
}

impl WorkoutSet {
    /// Create an incomplete set pre-filled with a starting weight.
    ///
    /// # Errors
    ///
    /// Returns `SetError` if the set number or target reps are zero, or the
    /// weight is negative or not finite.
    pub fn planned(set_number: u32, target_reps: u32, weight: f64) -> Result<Self, SetError> {
        if set_number == 0 {
            return Err(SetError::InvalidSetNumber);
        }
        if target_reps == 0 {
            return Err(SetError::InvalidTargetReps);
        }
        validate_weight(weight)?;

        Ok(Self {
            set_number,
            target_reps,
            completed_reps: None,
            weight: Some(weight),
            completed: false,
            difficulty: None,
        })
    }

    #[must_use]
    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    #[must_use]
    pub fn target_reps(&self) -> u32 {
        self.target_reps
    }

    #[must_use]
    pub fn completed_reps(&self) -> Option<u32> {
        self.completed_reps
    }

    #[must_use]
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<SetDifficulty> {
        self.difficulty
    }

    /// Mark the set as performed.
    ///
    /// Validation happens before any field changes, so a rejected call leaves
    /// the set untouched.
    ///
    /// # Errors
    ///
    /// Returns `SetError::AlreadyCompleted` for a set that was already
    /// completed and `SetError::InvalidWeight` for a negative/non-finite weight.
    pub fn complete(
        &mut self,
        reps: u32,
        weight: f64,
        difficulty: SetDifficulty,
    ) -> Result<(), SetError> {
        if self.completed {
            return Err(SetError::AlreadyCompleted {
                set_number: self.set_number,
            });
        }
        validate_weight(weight)?;

        self.completed = true;
        self.completed_reps = Some(reps);
        self.weight = Some(weight);
        self.difficulty = Some(difficulty);
        Ok(())
    }

    /// Reps that count toward volume: performed reps, or the target if none yet.
    #[must_use]
    pub fn effective_reps(&self) -> u32 {
        self.completed_reps.unwrap_or(self.target_reps)
    }

    /// `weight * effective_reps`, with a missing weight counting as zero.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.weight.unwrap_or(0.0) * f64::from(self.effective_reps())
    }
}

fn validate_weight(weight: f64) -> Result<(), SetError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(SetError::InvalidWeight)
    }
}
