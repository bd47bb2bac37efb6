//! Activity API Handlers
//!
//! Check-ins, game sessions, dashboard, weekly report and account deletion.

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::{
    api::{app_state::AppState, dto::activity_dto::*},
    engine,
    error::AppError,
    models::{CheckInEntry, NewGameSession},
    security::rbac::{Permission, Principal},
    security::validation::Validatable,
};

/// Record today's check-in, replacing an earlier one from the same day
///
/// POST /api/v1/me/check-ins
pub async fn create_check_in(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(entry): Json<CheckInEntry>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Check-in from user: {}", principal.user_id);
    principal.require(Permission::WriteOwnActivity)?;

    let outcome = state
        .activity_service
        .check_in(&principal.user_id, entry)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Turn free-text check-in answers into suggested numeric values
///
/// POST /api/v1/me/check-ins/analyze
pub async fn analyze_check_in(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<AnalyzeCheckInRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Analyzing check-in answers for user: {}", principal.user_id);
    principal.require(Permission::WriteOwnActivity)?;
    request.answers.validate()?;

    let analysis = state.narrator.analyze_check_in(&request.answers).await;

    Ok(Json(analysis))
}

/// Record a finished game
///
/// POST /api/v1/me/game-sessions
pub async fn create_game_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<NewGameSession>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Recording {} session for user: {}",
        request.game_type, principal.user_id
    );
    principal.require(Permission::WriteOwnActivity)?;

    let session = state
        .activity_service
        .record_session(&principal.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Recent check-ins and games, oldest first
///
/// GET /api/v1/me/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Loading dashboard for user: {}", principal.user_id);
    principal.require(Permission::ReadOwnActivity)?;

    let dashboard = state.activity_service.dashboard(&principal.user_id).await?;

    Ok(Json(dashboard))
}

/// Narrative report over the last 7 days
///
/// GET /api/v1/me/reports/weekly
pub async fn get_weekly_report(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Building weekly report for user: {}", principal.user_id);
    principal.require(Permission::ReadOwnActivity)?;

    let report = state
        .activity_service
        .weekly_report(&principal.user_id)
        .await?;

    Ok(Json(ReportResponse { report }))
}

/// Delete the caller's account together with every log and session
///
/// DELETE /api/v1/me
pub async fn delete_my_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Permission::WriteOwnActivity)?;

    let deletion = state
        .activity_service
        .delete_account(&principal.user_id)
        .await?;
    info!(
        "Deleted account {} ({} logs, {} sessions)",
        principal.user_id, deletion.logs_removed, deletion.sessions_removed
    );

    Ok(Json(deletion))
}

/// Evaluate the daily forecast rules for a check-in without storing it
///
/// POST /api/v1/forecast
///
/// Responds 204 when no rule matches.
pub async fn evaluate_forecast(
    Extension(principal): Extension<Principal>,
    Json(entry): Json<CheckInEntry>,
) -> Result<Response, AppError> {
    debug!("Evaluating forecast for user: {}", principal.user_id);
    entry.validate()?;

    Ok(match engine::forecast(&entry) {
        Some(forecast) => Json(ForecastResponse::from(forecast)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
