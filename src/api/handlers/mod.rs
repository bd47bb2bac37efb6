//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod activity_handler;
pub mod clinic_handler;
pub mod coach_handler;
pub mod profile_handler;

pub use activity_handler::*;
pub use clinic_handler::*;
pub use coach_handler::*;
pub use profile_handler::*;
