//! Routes 模块
//!
//! 定义 API 路由。

pub mod activity_routes;
pub mod clinic_routes;
pub mod coach_routes;
pub mod profile_routes;
