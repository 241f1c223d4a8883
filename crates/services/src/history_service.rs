use std::sync::Arc;

use chrono::{DateTime, Utc};
use dreppy_core::model::{SessionRecord, UserId};
use storage::repository::{StorageError, WorkoutLogRepository};

/// Header numbers of the history screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub completed_workouts: usize,
    pub last_workout: Option<DateTime<Utc>>,
}

impl HistoryStats {
    /// Sessions must be ordered newest first.
    #[must_use]
    pub fn from_sessions(sessions: &[SessionRecord]) -> Self {
        Self {
            completed_workouts: sessions.iter().filter(|s| s.is_completed()).count(),
            last_workout: sessions.first().map(|s| s.started_at),
        }
    }
}

#[derive(Clone)]
pub struct HistoryService {
    log: Arc<dyn WorkoutLogRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(log: Arc<dyn WorkoutLogRepository>) -> Self {
        Self { log }
    }

    /// Every session of `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    pub async fn sessions(&self, owner: UserId) -> Result<Vec<SessionRecord>, StorageError> {
        self.log.list_sessions(owner, None).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    pub async fn overview(
        &self,
        owner: UserId,
    ) -> Result<(HistoryStats, Vec<SessionRecord>), StorageError> {
        let sessions = self.sessions(owner).await?;
        Ok((HistoryStats::from_sessions(&sessions), sessions))
    }
}
