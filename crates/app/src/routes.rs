use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use dreppy_core::coaching::GENERIC_TIP;
use dreppy_core::model::UserId;
use serde::{Deserialize, Serialize};
use services::ai::ChatMessage;
use services::{
    AiError, AppServices, ChatError, ChatService, CoachingService, ExerciseContext,
    GeneratedWorkout, GenerationError, TipRequest, WorkoutGenerator,
};
use tracing::{error, warn};

/// Services reachable from the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub coaching: Arc<CoachingService>,
    pub chat: Arc<ChatService>,
    pub generator: Arc<WorkoutGenerator>,
}

impl From<&AppServices> for ApiState {
    fn from(services: &AppServices) -> Self {
        Self {
            coaching: services.coaching(),
            chat: services.chat(),
            generator: services.generator(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Serialize)]
pub struct TipResponse {
    pub tip: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub exercise_context: Option<ExerciseContext>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/coaching-tip", post(coaching_tip))
        .route("/api/chat", post(chat))
        .route("/api/generate-workout", post(generate_workout))
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    "ok"
}

async fn coaching_tip(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<TipRequest>, JsonRejection>,
) -> Json<TipResponse> {
    let tip = match body {
        Ok(Json(req)) => state.coaching.tip(&req).await,
        Err(rejection) => {
            warn!(error = %rejection, "unreadable coaching tip request");
            GENERIC_TIP.to_owned()
        }
    };
    Json(TipResponse { tip })
}

async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let Json(req) = body.map_err(|rejection| {
        warn!(error = %rejection, "unreadable chat request");
        chat_failure()
    })?;

    let message = state
        .chat
        .reply(
            &req.messages,
            req.exercise_context.as_ref(),
            req.user_id.map(UserId::new),
        )
        .await
        .map_err(|err| match err {
            ChatError::Ai(AiError::HttpStatus(status)) => {
                warn!(%status, "chat completion rejected upstream");
                (
                    StatusCode::from_u16(status.as_u16())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    Json(ApiError::new("Failed to get response from AI")),
                )
            }
            other => {
                error!(error = %other, "chat request failed");
                chat_failure()
            }
        })?;

    Ok(Json(ChatResponse { message }))
}

fn chat_failure() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(
            "An error occurred while processing your request",
        )),
    )
}

async fn generate_workout(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<GeneratedWorkout> {
    let Json(req) = body.map_err(|rejection| {
        warn!(error = %rejection, "unreadable generate request");
        generation_failure("An error occurred while generating the workout")
    })?;

    let workout = state.generator.generate(&req.prompt).await.map_err(|err| {
        error!(error = %err, "workout generation failed");
        let message = match err {
            GenerationError::EmptyCatalog => "No exercises found",
            GenerationError::Ai(_) => "AI generation failed",
            GenerationError::Parse(_) => "Failed to parse AI response",
            _ => "An error occurred while generating the workout",
        };
        generation_failure(message)
    })?;

    Ok(Json(workout))
}

fn generation_failure(message: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(message)),
    )
}
