//! Coach API Handlers
//!
//! LLM-backed feedback, daily content and chat. Every handler answers with
//! a canned text when the model is unavailable.

use axum::{
    Json,
    extract::{Extension, State},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::coach_dto::*},
    error::AppError,
    security::rbac::{Permission, Principal},
    security::validation::Validatable,
};

/// Short feedback on a finished game
///
/// POST /api/v1/games/feedback
pub async fn game_feedback(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<GameFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Game feedback for user {}: {} score {}",
        principal.user_id, request.game_type, request.score
    );
    principal.require(Permission::UseCoach)?;

    let feedback = state
        .narrator
        .game_feedback(request.game_type, request.score, request.level)
        .await;

    Ok(Json(FeedbackResponse { feedback }))
}

/// Today's educational content
///
/// GET /api/v1/daily-content
pub async fn daily_content(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Permission::UseCoach)?;

    let content = state.narrator.daily_content(Utc::now().date_naive()).await;

    Ok(Json(content))
}

/// Ask the coach a question
///
/// POST /api/v1/coach/chat
pub async fn coach_chat(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CoachChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Coach chat from user: {}", principal.user_id);
    principal.require(Permission::UseCoach)?;
    request.validate()?;

    let reply = state.narrator.coach_reply(request.message.trim()).await;

    Ok(Json(CoachChatResponse { reply }))
}
