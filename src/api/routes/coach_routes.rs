//! Coach Routes

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::coach_handler::*;

/// 创建教练路由器
pub fn create_coach_router() -> Router<AppState> {
    Router::new()
        .route("/games/feedback", post(game_feedback))
        .route("/daily-content", get(daily_content))
        .route("/coach/chat", post(coach_chat))
}
