//! Activity Routes
//!
//! 签到、游戏记录、仪表盘、周报和账户路由。

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::api::app_state::AppState;
use crate::api::handlers::activity_handler::*;

/// 创建活动路由器
pub fn create_activity_router() -> Router<AppState> {
    Router::new()
        // Check-ins
        .route("/me/check-ins", post(create_check_in))
        .route("/me/check-ins/analyze", post(analyze_check_in))
        .route("/forecast", post(evaluate_forecast))
        // Games
        .route("/me/game-sessions", post(create_game_session))
        // Read views
        .route("/me/dashboard", get(get_dashboard))
        .route("/me/reports/weekly", get(get_weekly_report))
        // Account
        .route("/me", delete(delete_my_account))
}
