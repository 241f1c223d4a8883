use chrono::{DateTime, Utc};
use dreppy_core::coaching::TipMode;
use dreppy_core::gesture::{Point, SwipeDirection};
use dreppy_core::model::{
    CatalogExercise, ExerciseId, ProgramId, SetDifficulty, UserId, WorkoutExercise, WorkoutSummary,
};
use dreppy_core::rest::RestWindow;
use services::chat::ExerciseContext;
use services::sessions::{
    ActiveSession, CompletedSet, RequestTag, SessionStart, WorkoutController,
};
use services::{
    AiError, ChatError, ChatService, CoachingService, MoveDirection, TipRequest,
    WorkoutLoopService,
};

use crate::state::ViewError;
use crate::vm::chat_vm::{ChatFailure, ChatThread, ChatTicket};
use crate::vm::number_wheel::format_value;
use crate::vm::overlay::Overlay;
use crate::vm::swipe::SwipeTracker;
use crate::vm::time_fmt::format_countdown;
use crate::vm::tip_scheduler::{TipScheduler, TipTrigger};

/// User actions on the workout screen that need no I/O.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorkoutIntent {
    SkipSet,
    SkipRest,
    Next,
    Previous,
    Move(MoveDirection),
    AdjustWeight(f64),
    SetWeight(f64),
    SetReps(u32),
    SetDifficulty(SetDifficulty),
    SetTipMode(TipMode),
    Toggle(Overlay),
    CloseOverlay,
    TouchStart(Point),
    TouchEnd(Point),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetRowVm {
    pub number: u32,
    pub label: String,
    pub completed: bool,
    pub is_current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExerciseCardVm {
    pub name: String,
    pub muscle_group: String,
    pub set_label: String,
    pub progress_label: String,
    pub is_complete: bool,
    pub sets: Vec<SetRowVm>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RestVm {
    pub remaining_label: String,
    pub fraction: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryVm {
    pub duration_label: String,
    pub exercises_label: String,
    pub sets_label: String,
    pub volume_label: String,
}

impl From<&WorkoutSummary> for SummaryVm {
    fn from(summary: &WorkoutSummary) -> Self {
        Self {
            duration_label: format!("{} min", summary.duration_minutes()),
            exercises_label: format!(
                "{}/{}",
                summary.exercises_completed(),
                summary.total_exercises()
            ),
            sets_label: summary.sets_completed().to_string(),
            volume_label: format!("{} kg", format_value(summary.total_volume())),
        }
    }
}

/// Screen state of an active workout.
pub struct WorkoutVm {
    session: ActiveSession,
    overlay: Overlay,
    swipe: SwipeTracker,
    tips: TipScheduler,
    chat: ChatThread,
    tip_text: Option<String>,
}

impl WorkoutVm {
    #[must_use]
    pub fn new(session: ActiveSession) -> Self {
        Self {
            session,
            overlay: Overlay::None,
            swipe: SwipeTracker::default(),
            tips: TipScheduler::default(),
            chat: ChatThread::default(),
            tip_text: None,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &WorkoutController {
        self.session.controller()
    }

    #[must_use]
    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    #[must_use]
    pub fn chat(&self) -> &ChatThread {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatThread {
        &mut self.chat
    }

    #[must_use]
    pub fn tip_text(&self) -> Option<&str> {
        self.tip_text.as_deref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.controller().is_complete()
    }

    fn observe(&mut self, now: DateTime<Utc>) {
        let controller = self.session.controller();
        let Some(exercise) = controller.active_exercise() else {
            return;
        };
        let trigger = TipTrigger {
            exercise: exercise.id(),
            weight: controller.pending_weight(),
            reps: controller.pending_reps(),
            resting: controller.is_resting(),
        };
        self.tips.observe(trigger, now);
    }

    /// Apply a local action.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Rejected` if the controller refuses the action.
    pub fn apply(&mut self, intent: WorkoutIntent, now: DateTime<Utc>) -> Result<(), ViewError> {
        let controller = self.session.controller_mut();
        match intent {
            WorkoutIntent::SkipSet => {
                controller.skip_set().map_err(ViewError::from)?;
            }
            WorkoutIntent::SkipRest => controller.skip_rest(),
            WorkoutIntent::Next => {
                controller.next();
            }
            WorkoutIntent::Previous => {
                controller.previous();
            }
            WorkoutIntent::Move(direction) => {
                controller.reorder(direction).map_err(ViewError::from)?;
            }
            WorkoutIntent::AdjustWeight(delta) => controller.adjust_weight(delta),
            WorkoutIntent::SetWeight(weight) => controller.set_pending_weight(weight),
            WorkoutIntent::SetReps(reps) => controller.set_pending_reps(reps),
            WorkoutIntent::SetDifficulty(difficulty) => controller.set_pending_difficulty(difficulty),
            WorkoutIntent::SetTipMode(mode) => {
                controller.set_tip_mode(mode);
                self.tips.request_now(now);
            }
            WorkoutIntent::Toggle(target) => self.overlay = self.overlay.toggle(target),
            WorkoutIntent::CloseOverlay => self.overlay = Overlay::None,
            WorkoutIntent::TouchStart(at) => self.swipe.begin(at),
            WorkoutIntent::TouchEnd(at) => match self.swipe.end(at) {
                Some(SwipeDirection::Next) => {
                    controller.next();
                }
                Some(SwipeDirection::Previous) => {
                    controller.previous();
                }
                None => {}
            },
        }
        self.observe(now);
        Ok(())
    }

    /// Complete the current set with the selectors and log it.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Rejected` when the current set is already done.
    pub async fn complete_set(
        &mut self,
        workout_loop: &WorkoutLoopService,
    ) -> Result<CompletedSet, ViewError> {
        let completed = workout_loop
            .complete_set(&mut self.session)
            .await
            .map_err(ViewError::from)?;
        self.observe(completed.completed_at);
        Ok(completed)
    }

    /// # Errors
    ///
    /// Returns `ViewError::Rejected` once the active exercise was started.
    pub async fn substitute(
        &mut self,
        workout_loop: &WorkoutLoopService,
        replacement: &CatalogExercise,
        now: DateTime<Utc>,
    ) -> Result<(), ViewError> {
        workout_loop
            .substitute(&mut self.session, replacement)
            .await
            .map_err(ViewError::from)?;
        self.overlay = Overlay::None;
        self.observe(now);
        Ok(())
    }

    /// Advance the rest countdown; returns the seconds left while resting.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<u32> {
        let remaining = self.session.controller_mut().tick(now);
        self.observe(now);
        remaining
    }

    #[must_use]
    pub fn rest_view(&self, now: DateTime<Utc>) -> Option<RestVm> {
        self.controller().rest().map(|window: &RestWindow| RestVm {
            remaining_label: format_countdown(window.remaining_secs(now)),
            fraction: window.elapsed_fraction(now),
        })
    }

    // ─── tips ────────────────────────────────────────────────────────────────

    /// A tagged tip request when the debounce window has passed.
    pub fn poll_tip(&mut self, now: DateTime<Utc>, hour: u32) -> Option<(RequestTag, TipRequest)> {
        if !self.tips.poll(now) {
            return None;
        }
        let request = self.controller().tip_request(now, hour)?;
        let tag = self.session.controller_mut().begin_tip()?;
        Some((tag, request))
    }

    /// Show a tip if it still matches the latest request.
    pub fn accept_tip(&mut self, tag: RequestTag, text: String) -> bool {
        if !self.session.controller_mut().accept_tip(tag, text.clone()) {
            return false;
        }
        self.tip_text = Some(text);
        true
    }

    /// Poll the debounce and, when due, fetch and show a tip.
    pub async fn refresh_tip(
        &mut self,
        coaching: &CoachingService,
        now: DateTime<Utc>,
        hour: u32,
    ) -> bool {
        let Some((tag, request)) = self.poll_tip(now, hour) else {
            return false;
        };
        let text = coaching.tip(&request).await;
        self.accept_tip(tag, text)
    }

    // ─── chat ────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn exercise_context(&self) -> Option<ExerciseContext> {
        let controller = self.controller();
        let exercise = controller.active_exercise()?;
        Some(ExerciseContext {
            name: exercise.name().to_owned(),
            muscle_group: exercise.muscle_group().to_owned(),
            current_set: exercise.current_set(),
            total_sets: exercise.total_sets(),
            target_reps: exercise.current().map(|s| s.target_reps()),
            weight: controller.pending_weight(),
        })
    }

    fn active_exercise_id(&self) -> Option<ExerciseId> {
        self.controller().active_exercise().map(WorkoutExercise::id)
    }

    /// Move the chat input into the thread, tagged with the active exercise.
    pub fn begin_chat(&mut self) -> Option<ChatTicket> {
        let context = self.exercise_context();
        let exercise = self.active_exercise_id();
        self.chat.submit(exercise, context)
    }

    /// Apply a chat reply unless the user moved to another exercise since
    /// the ticket was issued.
    pub fn finish_chat(&mut self, ticket: &ChatTicket, reply: Result<String, ChatFailure>) -> bool {
        let active = self.active_exercise_id();
        self.chat.resolve(ticket, active, reply)
    }

    /// Send the chat input with the active exercise as context.
    pub async fn send_chat(&mut self, chat: &ChatService) -> bool {
        let Some(ticket) = self.begin_chat() else {
            return false;
        };
        let reply = chat
            .reply(&ticket.messages, ticket.context.as_ref(), self.session.owner())
            .await
            .map_err(|err| match err {
                ChatError::Ai(AiError::Http(_)) => ChatFailure::Connection,
                _ => ChatFailure::Upstream,
            });
        self.finish_chat(&ticket, reply)
    }

    // ─── display ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn exercise_card(&self) -> Option<ExerciseCardVm> {
        let controller = self.controller();
        let exercise = controller.active_exercise()?;
        let progress = controller.progress();
        let sets = exercise
            .sets()
            .iter()
            .map(|set| {
                let label = match (set.completed_reps(), set.weight()) {
                    (Some(reps), Some(weight)) if set.is_completed() => {
                        format!("{} kg × {reps}", format_value(weight))
                    }
                    (_, weight) => format!(
                        "{} kg × {}",
                        format_value(weight.unwrap_or(0.0)),
                        set.target_reps()
                    ),
                };
                SetRowVm {
                    number: set.set_number(),
                    label,
                    completed: set.is_completed(),
                    is_current: set.set_number() == exercise.current_set(),
                }
            })
            .collect();

        Some(ExerciseCardVm {
            name: exercise.name().to_owned(),
            muscle_group: exercise.muscle_group().to_owned(),
            set_label: format!("Set {} of {}", exercise.current_set(), exercise.total_sets()),
            progress_label: format!(
                "{}/{} exercises",
                progress.completed_exercises, progress.total_exercises
            ),
            is_complete: exercise.is_complete(),
            sets,
        })
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if the summary cannot be computed.
    pub async fn finish(&self, workout_loop: &WorkoutLoopService) -> Result<SummaryVm, ViewError> {
        let summary = workout_loop
            .finish(&self.session)
            .await
            .map_err(ViewError::from)?;
        Ok(SummaryVm::from(&summary))
    }
}

/// # Errors
///
/// Returns `ViewError::NoWorkout` when the program cannot be run and
/// `ViewError::Unknown` for other failures.
pub async fn start_workout(
    workout_loop: &WorkoutLoopService,
    program: Option<ProgramId>,
    owner: Option<UserId>,
) -> Result<WorkoutVm, ViewError> {
    match workout_loop.start(program, owner).await {
        Ok(SessionStart::Ready(session)) => {
            let mut vm = WorkoutVm::new(session);
            vm.observe(workout_loop.clock().now());
            Ok(vm)
        }
        Ok(SessionStart::NoWorkout { reason }) => Err(ViewError::NoWorkout(reason)),
        Err(err) => Err(ViewError::from(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Duration;
    use dreppy_core::model::{ExerciseId, ProgramExercise};
    use dreppy_core::time::fixed_now;
    use services::Clock;
    use services::ai::{CompletionClient, CompletionRequest};
    use services::sessions::NoWorkoutReason;
    use storage::repository::{InMemoryRepository, NewProgramRecord, ProgramRepository};

    use super::*;
    use crate::vm::chat_vm::ERROR_REPLY;

    struct Canned(Option<&'static str>);

    #[async_trait]
    impl CompletionClient for Canned {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, AiError> {
            self.0.map(str::to_owned).ok_or(AiError::Disabled)
        }
    }

    async fn setup() -> (InMemoryRepository, WorkoutLoopService, ProgramId) {
        let repo = InMemoryRepository::new();
        let program = repo
            .insert_program(NewProgramRecord {
                owner: UserId::new(1),
                name: "Upper".into(),
                exercises: vec![
                    ProgramExercise::new(ExerciseId::new(1), "Bench", "Chest", 2, 8, 90).unwrap(),
                    ProgramExercise::new(ExerciseId::new(2), "Row", "Back", 1, 10, 60).unwrap(),
                ],
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let service = WorkoutLoopService::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        );
        (repo, service, program)
    }

    #[tokio::test]
    async fn start_reports_why_no_workout_opened() {
        let (_repo, service, _program) = setup().await;
        assert!(matches!(
            start_workout(&service, None, None).await,
            Err(ViewError::NoWorkout(NoWorkoutReason::NoProgramSelected))
        ));
    }

    #[tokio::test]
    async fn swipes_and_overlays_drive_navigation() {
        let (_repo, service, program) = setup().await;
        let mut vm = start_workout(&service, Some(program), None).await.unwrap();
        let now = fixed_now();

        vm.apply(WorkoutIntent::TouchStart(Point::new(300.0, 200.0)), now)
            .unwrap();
        vm.apply(WorkoutIntent::TouchEnd(Point::new(150.0, 210.0)), now)
            .unwrap();
        assert_eq!(vm.controller().active_index(), 1);

        vm.apply(WorkoutIntent::Toggle(Overlay::Chat), now).unwrap();
        assert_eq!(vm.overlay(), Overlay::Chat);
        vm.apply(WorkoutIntent::CloseOverlay, now).unwrap();
        assert_eq!(vm.overlay(), Overlay::None);
    }

    #[tokio::test]
    async fn completing_a_set_opens_the_rest_timer() {
        let (_repo, service, program) = setup().await;
        let mut vm = start_workout(&service, Some(program), None).await.unwrap();
        let now = fixed_now();

        vm.apply(WorkoutIntent::SetWeight(60.0), now).unwrap();
        let card = vm.exercise_card().unwrap();
        assert_eq!(card.set_label, "Set 1 of 2");

        vm.complete_set(&service).await.unwrap();
        let rest = vm.rest_view(now).unwrap();
        assert_eq!(rest.remaining_label, "1:30");

        let card = vm.exercise_card().unwrap();
        assert_eq!(card.set_label, "Set 2 of 2");
        assert_eq!(card.sets[0].label, "60 kg × 8");
        assert!(card.sets[0].completed);
        assert!(card.sets[1].is_current);

        vm.apply(WorkoutIntent::SkipRest, now).unwrap();
        assert!(vm.rest_view(now).is_none());
    }

    #[tokio::test]
    async fn tips_wait_for_the_debounce_and_drop_stale_answers() {
        let (_repo, service, program) = setup().await;
        let mut vm = start_workout(&service, Some(program), None).await.unwrap();
        let coaching = CoachingService::new(Arc::new(Canned(Some("Drive through your heels."))));
        let now = fixed_now();

        assert!(!vm.refresh_tip(&coaching, now, 9).await);
        assert!(vm.refresh_tip(&coaching, now + Duration::seconds(1), 9).await);
        assert_eq!(vm.tip_text(), Some("Drive through your heels."));

        vm.apply(WorkoutIntent::AdjustWeight(2.5), now).unwrap();
        let (stale, _) = vm.poll_tip(now + Duration::seconds(2), 9).unwrap();
        vm.apply(WorkoutIntent::Next, now).unwrap();
        assert!(!vm.accept_tip(stale, "old".into()));
        assert_eq!(vm.tip_text(), Some("Drive through your heels."));
    }

    #[tokio::test]
    async fn chat_replies_for_a_previous_exercise_are_dropped() {
        let (_repo, service, program) = setup().await;
        let mut vm = start_workout(&service, Some(program), None).await.unwrap();
        let now = fixed_now();

        vm.chat_mut().set_input("Should I pause at the bottom?");
        let ticket = vm.begin_chat().unwrap();
        assert_eq!(ticket.context.as_ref().unwrap().name, "Bench");

        vm.apply(WorkoutIntent::Next, now).unwrap();
        assert_eq!(vm.controller().active_exercise().unwrap().name(), "Row");
        assert!(!vm.finish_chat(&ticket, Ok("Pause for one count.".into())));
        assert_eq!(vm.chat().bubbles().len(), 1);
        assert!(!vm.chat().is_loading());

        vm.chat_mut().set_input("And for rows?");
        let ticket = vm.begin_chat().unwrap();
        assert!(vm.finish_chat(&ticket, Ok("Squeeze at the top.".into())));
        assert_eq!(vm.chat().bubbles().len(), 3);
    }

    #[tokio::test]
    async fn chat_failures_become_an_error_bubble() {
        let (repo, service, program) = setup().await;
        let mut vm = start_workout(&service, Some(program), None).await.unwrap();
        let chat = ChatService::new(Arc::new(Canned(None)), Arc::new(repo));

        assert!(!vm.send_chat(&chat).await);
        vm.chat_mut().set_input("How deep should I go?");
        assert!(vm.send_chat(&chat).await);

        let bubbles = vm.chat().bubbles();
        assert_eq!(bubbles.len(), 2);
        assert!(bubbles[0].from_user);
        assert_eq!(bubbles[1].text, ERROR_REPLY);
        assert_eq!(vm.exercise_context().unwrap().name, "Bench");
    }
}
