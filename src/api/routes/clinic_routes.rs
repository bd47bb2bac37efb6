//! Clinic Routes
//!
//! 管理员（临床医生）路由。

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::clinic_handler::*;

/// 创建临床端路由器
pub fn create_clinic_router() -> Router<AppState> {
    Router::new()
        .route("/admin/overview", get(get_overview))
        .route("/admin/patients", get(list_patients))
        .route("/admin/patients", post(enrol_patient))
        .route("/admin/patients/:id", get(get_patient))
        .route("/admin/patients/:id/profile", get(get_patient_profile))
        .route("/admin/patients/:id/insights", get(get_patient_insights))
}
