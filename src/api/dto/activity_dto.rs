//! 活动 DTO
//!
//! 签到、预测、周报和账户删除的请求与响应结构。

use serde::{Deserialize, Serialize};

use crate::engine::Forecast;
use crate::services::CheckInAnswers;

/// 每日预测响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResponse {
    /// 预测文本
    pub prediction: String,
    /// 命中的规则名
    pub rule: String,
}

impl From<Forecast> for ForecastResponse {
    fn from(forecast: Forecast) -> Self {
        Self {
            prediction: forecast.prediction,
            rule: forecast.rule,
        }
    }
}

/// 周报响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportResponse {
    pub report: String,
}

/// 签到问答分析请求
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeCheckInRequest {
    pub answers: CheckInAnswers,
}
