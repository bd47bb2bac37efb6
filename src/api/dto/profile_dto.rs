//! 画像 DTO

use serde::{Deserialize, Serialize};

/// 洞察列表响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
}
