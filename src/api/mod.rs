//! API 模块
//!
//! 提供 REST API 支持。`/api/v1` 下的全部路由都要求认证；
//! 健康检查路由不需要认证。

#[cfg(test)]
mod api_tests;
pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::app_state::AppState;
use crate::config::config::SecurityConfig;
use crate::error::AppError;
use crate::observability::{ObservabilityState, create_observability_router, metrics_middleware};
use crate::security::middleware::{
    auth_middleware, request_id_middleware, security_headers_middleware,
};

/// 根据配置构建 CORS 层，无法解析的来源会被跳过
fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn create_router(app_state: AppState) -> Router {
    let observability = ObservabilityState::new(
        env!("CARGO_PKG_VERSION"),
        app_state.repositories.clone(),
    );
    let metrics = observability.metrics.clone();
    let timeout = Duration::from_secs(app_state.config.server.request_timeout.max(1));
    let cors = cors_layer(&app_state.config.security);
    let body_limit = app_state.config.server.max_request_size;

    let api = Router::new()
        .merge(routes::profile_routes::create_profile_router())
        .merge(routes::activity_routes::create_activity_router())
        .merge(routes::coach_routes::create_coach_router())
        .merge(routes::clinic_routes::create_clinic_router())
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .nest("/api/v1", api)
        .with_state(app_state)
        .merge(create_observability_router(observability))
        // Add security headers middleware to all routes
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn initialize_api(app_state: AppState) -> Result<Router, AppError> {
    tracing::info!("Initializing API router...");
    Ok(create_router(app_state))
}
