use std::sync::Arc;

use dreppy_core::Clock;
use dreppy_core::model::{
    DEFAULT_TRAINING_DAYS, ExperienceLevel, FitnessGoal, Profile, UserId, name_from_email,
};
use storage::repository::{ProfileRecord, ProfileRepository};
use tracing::info;

use crate::error::ProfileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnboardingStep {
    Profile,
    Goals,
    Experience,
    Schedule,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::Profile,
        OnboardingStep::Goals,
        OnboardingStep::Experience,
        OnboardingStep::Schedule,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Following step; the last step stays put.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL
            .get(self.index() + 1)
            .copied()
            .unwrap_or(OnboardingStep::Schedule)
    }

    /// Preceding step; the first step stays put.
    #[must_use]
    pub fn previous(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(OnboardingStep::Profile)
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self == OnboardingStep::Schedule
    }
}

/// Answers collected while walking the onboarding steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingDraft {
    step: OnboardingStep,
    display_name: String,
    goals: Vec<FitnessGoal>,
    experience: Option<ExperienceLevel>,
    training_days: u8,
}

impl Default for OnboardingDraft {
    fn default() -> Self {
        Self {
            step: OnboardingStep::Profile,
            display_name: String::new(),
            goals: Vec::new(),
            experience: None,
            training_days: DEFAULT_TRAINING_DAYS,
        }
    }
}

impl OnboardingDraft {
    /// Start with the display name derived from the account email.
    #[must_use]
    pub fn for_email(email: &str) -> Self {
        Self {
            display_name: name_from_email(email),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    #[must_use]
    pub fn goals(&self) -> &[FitnessGoal] {
        &self.goals
    }

    /// Select or deselect `goal`; returns whether it is now selected.
    pub fn toggle_goal(&mut self, goal: FitnessGoal) -> bool {
        if let Some(pos) = self.goals.iter().position(|g| *g == goal) {
            self.goals.remove(pos);
            false
        } else {
            self.goals.push(goal);
            true
        }
    }

    #[must_use]
    pub fn experience(&self) -> Option<ExperienceLevel> {
        self.experience
    }

    pub fn set_experience(&mut self, level: ExperienceLevel) {
        self.experience = Some(level);
    }

    #[must_use]
    pub fn training_days(&self) -> u8 {
        self.training_days
    }

    pub fn set_training_days(&mut self, days: u8) {
        self.training_days = days;
    }

    /// Whether the current step has what it needs.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        match self.step {
            OnboardingStep::Profile => self.display_name.trim().chars().count() >= 2,
            OnboardingStep::Goals => !self.goals.is_empty(),
            OnboardingStep::Experience => self.experience.is_some(),
            OnboardingStep::Schedule => true,
        }
    }

    /// Advance when the current step is satisfied.
    pub fn next(&mut self) -> bool {
        if !self.can_proceed() || self.step.is_last() {
            return false;
        }
        self.step = self.step.next();
        true
    }

    pub fn back(&mut self) {
        self.step = self.step.previous();
    }

    /// # Errors
    ///
    /// Returns `ProfileError::Incomplete` when a step is unanswered and
    /// `ProfileError::Validation` for an invalid name or day count.
    pub fn into_profile(self, user: UserId) -> Result<Profile, ProfileError> {
        if self.goals.is_empty() || self.experience.is_none() {
            return Err(ProfileError::Incomplete);
        }
        Ok(Profile::new(
            user,
            self.display_name,
            self.goals,
            self.experience,
            self.training_days,
        )?)
    }
}

#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { clock, profiles }
    }

    /// Finish onboarding by storing the profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` for an incomplete draft or a storage failure.
    pub async fn complete(
        &self,
        user: UserId,
        email: Option<&str>,
        draft: OnboardingDraft,
    ) -> Result<Profile, ProfileError> {
        let profile = draft.into_profile(user)?;
        self.profiles
            .upsert_profile(&ProfileRecord {
                profile: profile.clone(),
                email: email.map(str::to_owned),
                updated_at: self.clock.now(),
            })
            .await?;
        info!(user = %user, goals = profile.goals().len(), "onboarding completed");
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns `ProfileError::Storage` on repository failures.
    pub async fn get(&self, user: UserId) -> Result<Option<Profile>, ProfileError> {
        Ok(self.profiles.get_profile(user).await?.map(|r| r.profile))
    }
}
