//! DTO 模块
//!
//! 数据传输对象，用于 API 请求和响应的序列化。

pub mod activity_dto;
pub mod clinic_dto;
pub mod coach_dto;
pub mod profile_dto;

pub use activity_dto::*;
pub use clinic_dto::*;
pub use coach_dto::*;
pub use profile_dto::*;
