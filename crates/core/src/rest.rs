use chrono::{DateTime, Duration, Utc};

/// An open rest period between sets.
///
/// Stored as an absolute deadline: remaining time is recomputed from the clock
/// on every read, so missed ticks or a suspended process never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestWindow {
    ends_at: DateTime<Utc>,
    duration_secs: u32,
}

impl RestWindow {
    #[must_use]
    pub fn start(now: DateTime<Utc>, duration_secs: u32) -> Self {
        Self {
            ends_at: now + Duration::seconds(i64::from(duration_secs)),
            duration_secs,
        }
    }

    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// `max(0, ceil((ends_at - now) / 1000 ms))`.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        let millis = (self.ends_at - now).num_milliseconds();
        if millis <= 0 {
            return 0;
        }
        let secs = (millis + 999) / 1000;
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }

    /// Progress in `[0, 1]` for a countdown ring.
    #[must_use]
    pub fn elapsed_fraction(&self, now: DateTime<Utc>) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        let remaining = f64::from(self.remaining_secs(now));
        let total = f64::from(self.duration_secs);
        (1.0 - remaining / total).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn remaining_rounds_up_partial_seconds() {
        let window = RestWindow::start(fixed_now(), 90);
        assert_eq!(window.remaining_secs(fixed_now()), 90);
        assert_eq!(window.remaining_secs(fixed_now() + Duration::milliseconds(500)), 90);
        assert_eq!(window.remaining_secs(fixed_now() + Duration::milliseconds(1_000)), 89);
        assert_eq!(window.remaining_secs(fixed_now() + Duration::milliseconds(89_001)), 1);
    }

    #[test]
    fn remaining_is_zero_at_and_after_deadline() {
        let window = RestWindow::start(fixed_now(), 60);
        assert_eq!(window.remaining_secs(window.ends_at()), 0);
        assert!(window.is_elapsed(fixed_now() + Duration::hours(3)));
    }

    #[test]
    fn jumping_the_clock_matches_regular_ticks() {
        let window = RestWindow::start(fixed_now(), 120);
        let mut ticked = 0;
        for second in 0..=45 {
            ticked = window.remaining_secs(fixed_now() + Duration::seconds(second));
        }
        assert_eq!(ticked, window.remaining_secs(fixed_now() + Duration::seconds(45)));
        assert_eq!(ticked, 75);
    }

    #[test]
    fn fraction_tracks_progress() {
        let window = RestWindow::start(fixed_now(), 100);
        assert!(window.elapsed_fraction(fixed_now()).abs() < f64::EPSILON);
        assert!((window.elapsed_fraction(fixed_now() + Duration::seconds(25)) - 0.25).abs() < 1e-9);
        assert!((RestWindow::start(fixed_now(), 0).elapsed_fraction(fixed_now()) - 1.0).abs() < f64::EPSILON);
    }
}
