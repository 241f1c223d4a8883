use dreppy_core::model::{SessionId, SessionRecord};
use services::HistoryStats;

use crate::vm::time_fmt::{format_datetime, format_day};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryCardVm {
    pub id: SessionId,
    pub name: String,
    pub day_str: String,
    pub started_at_str: String,
    pub duration_label: String,
    pub completed: bool,
}

impl From<&SessionRecord> for HistoryCardVm {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            day_str: format_day(record.started_at),
            started_at_str: format_datetime(record.started_at),
            duration_label: record.duration_label(),
            completed: record.is_completed(),
        }
    }
}

#[must_use]
pub fn map_history_cards(records: &[SessionRecord]) -> Vec<HistoryCardVm> {
    records.iter().map(HistoryCardVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryHeaderVm {
    pub workouts_label: String,
    pub last_workout_label: String,
}

#[must_use]
pub fn map_history_header(stats: HistoryStats) -> HistoryHeaderVm {
    let workouts_label = match stats.completed_workouts {
        1 => "1 workout".to_owned(),
        n => format!("{n} workouts"),
    };
    HistoryHeaderVm {
        workouts_label,
        last_workout_label: stats
            .last_workout
            .map_or_else(|| "No workouts yet".to_owned(), format_day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dreppy_core::model::SessionStatus;
    use dreppy_core::time::fixed_now;

    #[test]
    fn cards_show_duration_or_progress() {
        let done = SessionRecord {
            id: SessionId::new(2),
            program_id: None,
            name: "Legs".into(),
            status: SessionStatus::Completed,
            started_at: fixed_now(),
            completed_at: Some(fixed_now() + Duration::minutes(45)),
        };
        let open = SessionRecord {
            id: SessionId::new(3),
            status: SessionStatus::InProgress,
            completed_at: None,
            ..done.clone()
        };
        let cards = map_history_cards(&[done, open]);
        assert_eq!(cards[0].duration_label, "45 min");
        assert_eq!(cards[0].day_str, "Nov 14, 2023");
        assert_eq!(cards[1].duration_label, "In progress");
        assert!(!cards[1].completed);
    }

    #[test]
    fn header_handles_empty_history() {
        let header = map_history_header(HistoryStats::default());
        assert_eq!(header.workouts_label, "0 workouts");
        assert_eq!(header.last_workout_label, "No workouts yet");

        let one = map_history_header(HistoryStats {
            completed_workouts: 1,
            last_workout: Some(fixed_now()),
        });
        assert_eq!(one.workouts_label, "1 workout");
    }
}
