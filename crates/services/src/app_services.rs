use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::ai::{CompletionClient, OpenAiClient};
use crate::chat::ChatService;
use crate::coaching::CoachingService;
use crate::error::AppServicesError;
use crate::generator::WorkoutGenerator;
use crate::history_service::HistoryService;
use crate::profile_service::ProfileService;
use crate::program_service::ProgramService;
use crate::sessions::WorkoutLoopService;

/// Assembles app-facing services over one storage backend and one
/// completion client.
#[derive(Clone)]
pub struct AppServices {
    workout_loop: Arc<WorkoutLoopService>,
    coaching: Arc<CoachingService>,
    chat: Arc<ChatService>,
    generator: Arc<WorkoutGenerator>,
    programs: Arc<ProgramService>,
    history: Arc<HistoryService>,
    profiles: Arc<ProfileService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the environment's AI
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_parts(
            &storage,
            Arc::new(OpenAiClient::from_env()),
            clock,
        ))
    }

    /// Wire every service to `storage` and `client`.
    #[must_use]
    pub fn from_parts(storage: &Storage, client: Arc<dyn CompletionClient>, clock: Clock) -> Self {
        let workout_loop = Arc::new(WorkoutLoopService::new(
            clock,
            Arc::clone(&storage.programs),
            Arc::clone(&storage.history),
            Arc::clone(&storage.workout_log),
            Arc::clone(&storage.profiles),
        ));
        let coaching = Arc::new(CoachingService::new(Arc::clone(&client)));
        let chat = Arc::new(ChatService::new(
            Arc::clone(&client),
            Arc::clone(&storage.history),
        ));
        let generator = Arc::new(WorkoutGenerator::new(client, Arc::clone(&storage.catalog)));
        let programs = Arc::new(ProgramService::new(
            clock,
            Arc::clone(&storage.programs),
            Arc::clone(&storage.catalog),
        ));
        let history = Arc::new(HistoryService::new(Arc::clone(&storage.workout_log)));
        let profiles = Arc::new(ProfileService::new(clock, Arc::clone(&storage.profiles)));

        Self {
            workout_loop,
            coaching,
            chat,
            generator,
            programs,
            history,
            profiles,
        }
    }

    #[must_use]
    pub fn workout_loop(&self) -> Arc<WorkoutLoopService> {
        Arc::clone(&self.workout_loop)
    }

    #[must_use]
    pub fn coaching(&self) -> Arc<CoachingService> {
        Arc::clone(&self.coaching)
    }

    #[must_use]
    pub fn chat(&self) -> Arc<ChatService> {
        Arc::clone(&self.chat)
    }

    #[must_use]
    pub fn generator(&self) -> Arc<WorkoutGenerator> {
        Arc::clone(&self.generator)
    }

    #[must_use]
    pub fn programs(&self) -> Arc<ProgramService> {
        Arc::clone(&self.programs)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }
}
