//! Profile Routes
//!
//! 认知画像与洞察路由。

use axum::{Router, routing::get};

use crate::api::app_state::AppState;
use crate::api::handlers::profile_handler::*;

/// 创建画像路由器
pub fn create_profile_router() -> Router<AppState> {
    Router::new()
        .route("/me/profile", get(get_my_profile))
        .route("/me/insights", get(get_my_insights))
}
