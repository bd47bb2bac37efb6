//! Profile API Handlers
//!
//! Cognitive profile and insights for the calling user.

use axum::{
    Json,
    extract::{Extension, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::profile_dto::*},
    error::AppError,
    security::rbac::{Permission, Principal},
};

/// Get the caller's cognitive profile over the last 30 days
///
/// GET /api/v1/me/profile
pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Computing cognitive profile for user: {}", principal.user_id);
    principal.require(Permission::ReadOwnActivity)?;

    let profile = state
        .profile_service
        .cognitive_profile(&principal.user_id)
        .await?;

    Ok(Json(profile))
}

/// Get insights derived from the caller's last 7 days
///
/// GET /api/v1/me/insights
pub async fn get_my_insights(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Generating insights for user: {}", principal.user_id);
    principal.require(Permission::ReadOwnActivity)?;

    let insights = state.profile_service.insights(&principal.user_id).await?;

    Ok(Json(InsightsResponse { insights }))
}
