//! Clinic API Handlers
//!
//! Administrator views over every patient.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{
        app_state::AppState,
        dto::{clinic_dto::*, profile_dto::InsightsResponse},
    },
    error::AppError,
    security::rbac::{Permission, Principal},
};

/// Aggregate counts and recent high-fatigue alerts
///
/// GET /api/v1/admin/overview
pub async fn get_overview(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Clinic overview requested by: {}", principal.user_id);
    principal.require(Permission::ReadPatientRecords)?;

    let overview = state.clinic_service.overview().await?;

    Ok(Json(overview))
}

/// List patients with their activity counts
///
/// GET /api/v1/admin/patients
pub async fn list_patients(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Permission::ReadPatientRecords)?;

    let patients = state.clinic_service.list_patients().await?;

    Ok(Json(patients))
}

/// Enrol a new patient
///
/// POST /api/v1/admin/patients
pub async fn enrol_patient(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<EnrolPatientRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Enrolling patient on behalf of: {}", principal.user_id);
    principal.require(Permission::ManagePatients)?;

    let patient = state.clinic_service.enrol_patient(&request.email).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

/// Patient record with recent logs and sessions
///
/// GET /api/v1/admin/patients/:id
pub async fn get_patient(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Loading patient {} for: {}", patient_id, principal.user_id);
    principal.require(Permission::ReadPatientRecords)?;

    let detail = state.clinic_service.patient_detail(&patient_id).await?;

    Ok(Json(detail))
}

/// Cognitive profile of a patient
///
/// GET /api/v1/admin/patients/:id/profile
pub async fn get_patient_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Permission::ReadPatientRecords)?;

    let profile = state.clinic_service.patient_profile(&patient_id).await?;

    Ok(Json(profile))
}

/// Insights for a patient
///
/// GET /api/v1/admin/patients/:id/insights
pub async fn get_patient_insights(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Permission::ReadPatientRecords)?;

    let insights = state.clinic_service.patient_insights(&patient_id).await?;

    Ok(Json(InsightsResponse { insights }))
}
