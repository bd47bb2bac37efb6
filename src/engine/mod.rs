//! 评分与洞察引擎
//!
//! 纯函数、无状态：输入为某个用户在时间窗口内的签到与游戏记录，
//! 输出各认知领域得分、洞察文本和每日预测。不做任何 IO。

pub mod forecast;
pub mod insights;
pub mod normalize;
pub mod scoring;
pub mod window;

pub use forecast::{Forecast, forecast};
pub use insights::{FALLBACK_INSIGHT, InsightRule, generate_insights};
pub use normalize::normalize;
pub use scoring::compute_scores;
pub use window::ActivityWindow;
