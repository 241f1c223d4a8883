use chrono::{DateTime, Duration, Utc};
use dreppy_core::model::ExerciseId;

/// Quiet period after the last relevant change before a tip is fetched.
pub const TIP_DEBOUNCE_MS: i64 = 800;

/// The inputs whose change should lead to a fresh tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TipTrigger {
    pub exercise: ExerciseId,
    pub weight: f64,
    pub reps: u32,
    pub resting: bool,
}

/// Debounces tip refreshes against a caller-supplied clock.
#[derive(Debug, Clone)]
pub struct TipScheduler {
    debounce: Duration,
    last: Option<TipTrigger>,
    due_at: Option<DateTime<Utc>>,
}

impl Default for TipScheduler {
    fn default() -> Self {
        Self::new(Duration::milliseconds(TIP_DEBOUNCE_MS))
    }
}

impl TipScheduler {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            last: None,
            due_at: None,
        }
    }

    /// Record the current inputs; a change restarts the quiet period.
    pub fn observe(&mut self, trigger: TipTrigger, now: DateTime<Utc>) -> bool {
        if self.last == Some(trigger) {
            return false;
        }
        self.last = Some(trigger);
        self.due_at = Some(now + self.debounce);
        true
    }

    /// Ask for a tip on the next poll regardless of the quiet period.
    pub fn request_now(&mut self, now: DateTime<Utc>) {
        self.due_at = Some(now);
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// True once per scheduled refresh, when its quiet period has passed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.due_at {
            Some(due) if due <= now => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreppy_core::time::fixed_now;

    fn trigger(weight: f64) -> TipTrigger {
        TipTrigger {
            exercise: ExerciseId::new(1),
            weight,
            reps: 8,
            resting: false,
        }
    }

    #[test]
    fn fires_once_after_the_quiet_period() {
        let mut scheduler = TipScheduler::default();
        let now = fixed_now();
        assert!(scheduler.observe(trigger(60.0), now));
        assert!(!scheduler.poll(now + Duration::milliseconds(799)));
        assert!(scheduler.poll(now + Duration::milliseconds(800)));
        assert!(!scheduler.poll(now + Duration::seconds(5)));
    }

    #[test]
    fn rapid_changes_restart_the_timer() {
        let mut scheduler = TipScheduler::default();
        let now = fixed_now();
        scheduler.observe(trigger(60.0), now);
        scheduler.observe(trigger(62.5), now + Duration::milliseconds(500));
        assert!(!scheduler.poll(now + Duration::milliseconds(900)));
        assert!(scheduler.poll(now + Duration::milliseconds(1_300)));
    }

    #[test]
    fn unchanged_inputs_do_not_reschedule() {
        let mut scheduler = TipScheduler::default();
        let now = fixed_now();
        scheduler.observe(trigger(60.0), now);
        assert!(scheduler.poll(now + Duration::seconds(1)));
        assert!(!scheduler.observe(trigger(60.0), now + Duration::seconds(2)));
        assert!(!scheduler.is_pending());
    }
}
