use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::ids::{ExerciseId, ProgramId, SessionId};

/// A completed set as read back from history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPerformance {
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub performed_at: DateTime<Utc>,
}

/// Heaviest completed set for an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub weight: f64,
    pub reps: u32,
}

/// Prior performance for one exercise, used to pre-fill weights and to give
/// the coach something to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseHistory {
    pub last_weight: f64,
    pub last_reps: u32,
    pub personal_record: Option<PersonalRecord>,
}

impl ExerciseHistory {
    /// Build from completed sets ordered newest first.
    ///
    /// The first set provides the last weight/reps. The record is the
    /// heaviest set; ties keep the most recent one.
    #[must_use]
    pub fn from_sets(sets_newest_first: &[SetPerformance]) -> Self {
        let Some(latest) = sets_newest_first.first() else {
            return Self::default();
        };

        Self {
            last_weight: latest.weight,
            last_reps: latest.reps,
            personal_record: personal_record(sets_newest_first),
        }
    }

    /// Weight pre-filled into every set of a new session.
    #[must_use]
    pub fn starting_weight(&self) -> f64 {
        self.last_weight
    }

    #[must_use]
    pub fn pr_weight(&self) -> f64 {
        self.personal_record.map_or(0.0, |pr| pr.weight)
    }

    #[must_use]
    pub fn pr_reps(&self) -> u32 {
        self.personal_record.map_or(0, |pr| pr.reps)
    }
}

fn personal_record(sets: &[SetPerformance]) -> Option<PersonalRecord> {
    let mut best: Option<PersonalRecord> = None;
    for set in sets.iter().filter(|s| s.weight > 0.0) {
        if best.is_none_or(|b| set.weight > b.weight) {
            best = Some(PersonalRecord {
                weight: set.weight,
                reps: set.reps,
            });
        }
    }
    best
}

/// Records per exercise name across a batch of recent sets (newest first).
///
/// Sets without weight are ignored, matching how records are reported to the
/// chat assistant.
#[must_use]
pub fn personal_records_by_name(sets_newest_first: &[SetPerformance]) -> Vec<(String, PersonalRecord)> {
    let mut order: Vec<String> = Vec::new();
    let mut records: HashMap<String, PersonalRecord> = HashMap::new();

    for set in sets_newest_first.iter().filter(|s| s.weight > 0.0) {
        match records.get_mut(&set.exercise_name) {
            Some(pr) if set.weight > pr.weight => {
                *pr = PersonalRecord {
                    weight: set.weight,
                    reps: set.reps,
                };
            }
            Some(_) => {}
            None => {
                order.push(set.exercise_name.clone());
                records.insert(
                    set.exercise_name.clone(),
                    PersonalRecord {
                        weight: set.weight,
                        reps: set.reps,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| records.remove(&name).map(|pr| (name, pr)))
        .collect()
}

//
// ─── SESSION RECORDS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// One persisted workout session as listed in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    /// `None` once the program was deleted.
    pub program_id: Option<ProgramId>,
    pub name: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Whole minutes between start and completion, `None` while in progress.
    #[must_use]
    pub fn duration_minutes(&self) -> Option<i64> {
        self.completed_at
            .map(|end| (end - self.started_at).num_minutes())
    }

    /// `"In progress"` or `"<n> min"`.
    #[must_use]
    pub fn duration_label(&self) -> String {
        match self.duration_minutes() {
            Some(minutes) => format!("{minutes} min"),
            None => "In progress".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn perf(name: &str, weight: f64, reps: u32, minutes_ago: i64) -> SetPerformance {
        SetPerformance {
            exercise_id: ExerciseId::new(1),
            exercise_name: name.into(),
            weight,
            reps,
            performed_at: fixed_now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn history_uses_latest_set_and_heaviest_record() {
        let sets = vec![
            perf("Bench", 80.0, 8, 1),
            perf("Bench", 90.0, 3, 10),
            perf("Bench", 85.0, 5, 20),
        ];
        let history = ExerciseHistory::from_sets(&sets);
        assert!((history.last_weight - 80.0).abs() < f64::EPSILON);
        assert_eq!(history.last_reps, 8);
        assert!((history.pr_weight() - 90.0).abs() < f64::EPSILON);
        assert_eq!(history.pr_reps(), 3);
    }

    #[test]
    fn record_tie_keeps_most_recent() {
        let sets = vec![perf("Bench", 90.0, 5, 1), perf("Bench", 90.0, 2, 10)];
        assert_eq!(ExerciseHistory::from_sets(&sets).pr_reps(), 5);
    }

    #[test]
    fn empty_history_starts_at_zero() {
        let history = ExerciseHistory::from_sets(&[]);
        assert!(history.starting_weight().abs() < f64::EPSILON);
        assert!(history.personal_record.is_none());
    }

    #[test]
    fn records_by_name_skip_unweighted_sets() {
        let sets = vec![
            perf("Pull Up", 0.0, 12, 1),
            perf("Squat", 100.0, 5, 2),
            perf("Squat", 120.0, 3, 3),
        ];
        let records = personal_records_by_name(&sets);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "Squat");
        assert!((records[0].1.weight - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_label_formats_minutes() {
        let mut record = SessionRecord {
            id: SessionId::new(1),
            program_id: None,
            name: "Push".into(),
            status: SessionStatus::InProgress,
            started_at: fixed_now(),
            completed_at: None,
        };
        assert_eq!(record.duration_label(), "In progress");

        record.status = SessionStatus::Completed;
        record.completed_at = Some(fixed_now() + Duration::seconds(61 * 60 + 59));
        assert_eq!(record.duration_label(), "61 min");
    }
}
