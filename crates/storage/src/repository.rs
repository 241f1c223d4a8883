use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dreppy_core::model::{
    CatalogExercise, CatalogFilter, ExerciseId, Profile, Program, ProgramExercise, ProgramId,
    SessionId, SessionRecord, SessionStatus, SetDifficulty, SetPerformance, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Insert shape for a program; the id is assigned by the backend.
#[derive(Debug, Clone)]
pub struct NewProgramRecord {
    pub owner: UserId,
    pub name: String,
    pub exercises: Vec<ProgramExercise>,
    pub created_at: DateTime<Utc>,
}

/// Row id of an exercise within a persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionExerciseId(pub i64);

/// One completed set as written to the workout log.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSetRecord {
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
    pub difficulty: SetDifficulty,
    pub completed_at: DateTime<Utc>,
}

/// Profile plus the account email it was created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub profile: Profile,
    pub email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Repository contract for saved workout templates.
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Insert a new program with its ordered exercises.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the program cannot be stored.
    async fn insert_program(&self, program: NewProgramRecord) -> Result<ProgramId, StorageError>;

    /// Fetch a program with its exercises in order; `None` when missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError>;

    /// List an owner's programs, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_programs(&self, owner: UserId, limit: u32) -> Result<Vec<Program>, StorageError>;

    /// Delete one of the owner's programs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owner has no such program.
    async fn delete_program(&self, owner: UserId, id: ProgramId) -> Result<(), StorageError>;
}

/// Repository contract for the exercise library.
#[async_trait]
pub trait ExerciseCatalogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the exercise cannot be stored.
    async fn upsert_exercise(&self, exercise: &CatalogExercise) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_exercise(&self, id: ExerciseId) -> Result<Option<CatalogExercise>, StorageError>;

    /// Highest rated exercises first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn top_rated(&self, limit: u32) -> Result<Vec<CatalogExercise>, StorageError>;

    /// Filtered browse, highest rated first, at most `filter.limit` rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn search(&self, filter: &CatalogFilter) -> Result<Vec<CatalogExercise>, StorageError>;
}

/// Repository contract for persisted sessions and their completed sets.
#[async_trait]
pub trait WorkoutLogRepository: Send + Sync {
    /// Create an `in_progress` session row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be created.
    async fn start_session(
        &self,
        owner: UserId,
        program_id: ProgramId,
        name: &str,
        started_at: DateTime<Utc>,
    ) -> Result<SessionId, StorageError>;

    /// Return the row for `exercise` within `session`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown session.
    async fn ensure_session_exercise(
        &self,
        session: SessionId,
        exercise: ExerciseId,
        order_index: u32,
    ) -> Result<SessionExerciseId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown session exercise.
    async fn append_set(
        &self,
        session_exercise: SessionExerciseId,
        set: &CompletedSetRecord,
    ) -> Result<(), StorageError>;

    /// Stamp `completed_at` and mark the session completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown session.
    async fn complete_session(
        &self,
        session: SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Sessions newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sessions(
        &self,
        owner: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<SessionRecord>, StorageError>;
}

/// Read side over completed sets.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Completed sets of one exercise, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn sets_for_exercise(
        &self,
        owner: UserId,
        exercise: ExerciseId,
    ) -> Result<Vec<SetPerformance>, StorageError>;

    /// The `limit` most recent completed sets across all exercises.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn recent_sets(&self, owner: UserId, limit: u32) -> Result<Vec<SetPerformance>, StorageError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRecord>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct SessionRow {
    owner: UserId,
    record: SessionRecord,
}

#[derive(Debug, Clone)]
struct SessionExerciseRow {
    session: SessionId,
    exercise: ExerciseId,
}

#[derive(Debug, Clone)]
struct SetRow {
    session_exercise: SessionExerciseId,
    record: CompletedSetRecord,
}

#[derive(Debug, Default)]
struct Tables {
    programs: HashMap<ProgramId, Program>,
    exercises: HashMap<ExerciseId, CatalogExercise>,
    sessions: HashMap<SessionId, SessionRow>,
    session_exercises: HashMap<SessionExerciseId, SessionExerciseRow>,
    sets: Vec<SetRow>,
    profiles: HashMap<UserId, ProfileRecord>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn performance(&self, row: &SetRow) -> Option<(UserId, SetPerformance)> {
        let link = self.session_exercises.get(&row.session_exercise)?;
        let session = self.sessions.get(&link.session)?;
        let name = self
            .exercises
            .get(&link.exercise)
            .map_or_else(String::new, |e| e.name.clone());
        Some((
            session.owner,
            SetPerformance {
                exercise_id: link.exercise,
                exercise_name: name,
                weight: row.record.weight,
                reps: row.record.reps,
                performed_at: row.record.completed_at,
            },
        ))
    }

    /// Sets for `owner`, newest first; insertion order breaks timestamp ties.
    fn owner_sets(&self, owner: UserId) -> Vec<SetPerformance> {
        let mut out: Vec<(usize, SetPerformance)> = self
            .sets
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                self.performance(row)
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, p)| (i, p))
            })
            .collect();
        out.sort_by(|(ia, a), (ib, b)| b.performed_at.cmp(&a.performed_at).then(ib.cmp(ia)));
        out.into_iter().map(|(_, p)| p).collect()
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgramRepository for InMemoryRepository {
    async fn insert_program(&self, program: NewProgramRecord) -> Result<ProgramId, StorageError> {
        let mut guard = self.lock()?;
        let id = ProgramId::new(guard.next_id());
        let program = Program::new(
            id,
            program.owner,
            program.name,
            program.exercises,
            program.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.programs.insert(id, program);
        Ok(id)
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.programs.get(&id).cloned())
    }

    async fn list_programs(&self, owner: UserId, limit: u32) -> Result<Vec<Program>, StorageError> {
        let guard = self.lock()?;
        let mut programs: Vec<Program> = guard
            .programs
            .values()
            .filter(|p| p.owner() == owner)
            .cloned()
            .collect();
        programs.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then(b.id().cmp(&a.id()))
        });
        programs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(programs)
    }

    async fn delete_program(&self, owner: UserId, id: ProgramId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.programs.get(&id) {
            Some(p) if p.owner() == owner => {
                guard.programs.remove(&id);
                for row in guard.sessions.values_mut() {
                    if row.record.program_id == Some(id) {
                        row.record.program_id = None;
                    }
                }
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }
}

#[async_trait]
impl ExerciseCatalogRepository for InMemoryRepository {
    async fn upsert_exercise(&self, exercise: &CatalogExercise) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.exercises.insert(exercise.id, exercise.clone());
        Ok(())
    }

    async fn get_exercise(&self, id: ExerciseId) -> Result<Option<CatalogExercise>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.exercises.get(&id).cloned())
    }

    async fn top_rated(&self, limit: u32) -> Result<Vec<CatalogExercise>, StorageError> {
        self.search(&CatalogFilter {
            limit: usize::try_from(limit).unwrap_or(usize::MAX),
            ..CatalogFilter::default()
        })
        .await
    }

    async fn search(&self, filter: &CatalogFilter) -> Result<Vec<CatalogExercise>, StorageError> {
        let guard = self.lock()?;
        let mut hits: Vec<CatalogExercise> = guard
            .exercises
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));
        hits.truncate(filter.limit);
        Ok(hits)
    }
}

#[async_trait]
impl WorkoutLogRepository for InMemoryRepository {
    async fn start_session(
        &self,
        owner: UserId,
        program_id: ProgramId,
        name: &str,
        started_at: DateTime<Utc>,
    ) -> Result<SessionId, StorageError> {
        let mut guard = self.lock()?;
        let id = SessionId::new(guard.next_id());
        guard.sessions.insert(
            id,
            SessionRow {
                owner,
                record: SessionRecord {
                    id,
                    program_id: Some(program_id),
                    name: name.to_owned(),
                    status: SessionStatus::InProgress,
                    started_at,
                    completed_at: None,
                },
            },
        );
        Ok(id)
    }

    async fn ensure_session_exercise(
        &self,
        session: SessionId,
        exercise: ExerciseId,
        _order_index: u32,
    ) -> Result<SessionExerciseId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.sessions.contains_key(&session) {
            return Err(StorageError::NotFound);
        }
        if let Some((id, _)) = guard
            .session_exercises
            .iter()
            .find(|(_, row)| row.session == session && row.exercise == exercise)
        {
            return Ok(*id);
        }
        let raw = guard.next_id();
        let id = SessionExerciseId(
            i64::try_from(raw).map_err(|_| StorageError::Serialization("id overflow".into()))?,
        );
        guard
            .session_exercises
            .insert(id, SessionExerciseRow { session, exercise });
        Ok(id)
    }

    async fn append_set(
        &self,
        session_exercise: SessionExerciseId,
        set: &CompletedSetRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.session_exercises.contains_key(&session_exercise) {
            return Err(StorageError::NotFound);
        }
        guard.sets.push(SetRow {
            session_exercise,
            record: set.clone(),
        });
        Ok(())
    }

    async fn complete_session(
        &self,
        session: SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let row = guard
            .sessions
            .get_mut(&session)
            .ok_or(StorageError::NotFound)?;
        row.record.status = SessionStatus::Completed;
        row.record.completed_at = Some(completed_at);
        Ok(())
    }

    async fn list_sessions(
        &self,
        owner: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let guard = self.lock()?;
        let mut sessions: Vec<SessionRecord> = guard
            .sessions
            .values()
            .filter(|row| row.owner == owner)
            .map(|row| row.record.clone())
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            sessions.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(sessions)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryRepository {
    async fn sets_for_exercise(
        &self,
        owner: UserId,
        exercise: ExerciseId,
    ) -> Result<Vec<SetPerformance>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .owner_sets(owner)
            .into_iter()
            .filter(|s| s.exercise_id == exercise)
            .collect())
    }

    async fn recent_sets(&self, owner: UserId, limit: u32) -> Result<Vec<SetPerformance>, StorageError> {
        let guard = self.lock()?;
        let mut sets = guard.owner_sets(owner);
        sets.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(sets)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .profiles
            .insert(record.profile.user_id(), record.clone());
        Ok(())
    }

    async fn get_profile(&self, user: UserId) -> Result<Option<ProfileRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.profiles.get(&user).cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub programs: Arc<dyn ProgramRepository>,
    pub catalog: Arc<dyn ExerciseCatalogRepository>,
    pub workout_log: Arc<dyn WorkoutLogRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wire every contract to one backend value.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: ProgramRepository
            + ExerciseCatalogRepository
            + WorkoutLogRepository
            + HistoryRepository
            + ProfileRepository
            + Clone
            + 'static,
    {
        Self {
            programs: Arc::new(repo.clone()),
            catalog: Arc::new(repo.clone()),
            workout_log: Arc::new(repo.clone()),
            history: Arc::new(repo.clone()),
            profiles: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dreppy_core::time::fixed_now;

    fn bench() -> CatalogExercise {
        CatalogExercise {
            id: ExerciseId::new(10),
            name: "Bench Press".into(),
            equipment: Some("Barbell".into()),
            body_part: Some("Chest".into()),
            target_muscle: None,
            rating: 9.0,
        }
    }

    fn set(n: u32, weight: f64, at: DateTime<Utc>) -> CompletedSetRecord {
        CompletedSetRecord {
            set_number: n,
            reps: 8,
            weight,
            difficulty: SetDifficulty::Normal,
            completed_at: at,
        }
    }

    #[tokio::test]
    async fn session_exercise_is_created_once() {
        let repo = InMemoryRepository::new();
        let session = repo
            .start_session(UserId::new(1), ProgramId::new(1), "Push", fixed_now())
            .await
            .unwrap();
        let a = repo
            .ensure_session_exercise(session, ExerciseId::new(10), 0)
            .await
            .unwrap();
        let b = repo
            .ensure_session_exercise(session, ExerciseId::new(10), 0)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn history_is_scoped_to_owner_and_newest_first() {
        let repo = InMemoryRepository::new();
        repo.upsert_exercise(&bench()).await.unwrap();

        let mine = repo
            .start_session(UserId::new(1), ProgramId::new(1), "Push", fixed_now())
            .await
            .unwrap();
        let theirs = repo
            .start_session(UserId::new(2), ProgramId::new(1), "Push", fixed_now())
            .await
            .unwrap();
        let mine_ex = repo.ensure_session_exercise(mine, bench().id, 0).await.unwrap();
        let theirs_ex = repo.ensure_session_exercise(theirs, bench().id, 0).await.unwrap();

        repo.append_set(mine_ex, &set(1, 60.0, fixed_now())).await.unwrap();
        repo.append_set(mine_ex, &set(2, 65.0, fixed_now() + Duration::minutes(3)))
            .await
            .unwrap();
        repo.append_set(theirs_ex, &set(1, 200.0, fixed_now())).await.unwrap();

        let sets = repo.sets_for_exercise(UserId::new(1), bench().id).await.unwrap();
        assert_eq!(sets.len(), 2);
        assert!((sets[0].weight - 65.0).abs() < f64::EPSILON);
        assert_eq!(sets[0].exercise_name, "Bench Press");
    }

    #[tokio::test]
    async fn completing_a_session_stamps_status() {
        let repo = InMemoryRepository::new();
        let id = repo
            .start_session(UserId::new(1), ProgramId::new(1), "Legs", fixed_now())
            .await
            .unwrap();
        repo.complete_session(id, fixed_now() + Duration::minutes(40))
            .await
            .unwrap();
        let sessions = repo.list_sessions(UserId::new(1), None).await.unwrap();
        assert_eq!(sessions[0].status, SessionStatus::Completed);
        assert_eq!(sessions[0].duration_label(), "40 min");
    }

    #[tokio::test]
    async fn delete_requires_owner() {
        let repo = InMemoryRepository::new();
        let id = repo
            .insert_program(NewProgramRecord {
                owner: UserId::new(1),
                name: "Push".into(),
                exercises: vec![ProgramExercise::from_catalog(&bench())],
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        assert!(matches!(
            repo.delete_program(UserId::new(2), id).await,
            Err(StorageError::NotFound)
        ));
        repo.delete_program(UserId::new(1), id).await.unwrap();
        assert!(repo.get_program(id).await.unwrap().is_none());
    }
}
