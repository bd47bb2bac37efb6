//! 教练 DTO

use serde::{Deserialize, Serialize};

use crate::models::GameType;
use crate::security::validation::{Validatable, ValidationResult, validators};

/// 单局游戏反馈请求
#[derive(Debug, Clone, Deserialize)]
pub struct GameFeedbackRequest {
    pub game_type: GameType,
    pub score: u32,
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

/// 游戏反馈响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackResponse {
    pub feedback: String,
}

/// 教练对话请求
#[derive(Debug, Clone, Deserialize)]
pub struct CoachChatRequest {
    pub message: String,
}

impl Validatable for CoachChatRequest {
    fn validate(&self) -> ValidationResult<()> {
        validators::validate_message("message", &self.message)
    }
}

/// 教练对话响应
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachChatResponse {
    pub reply: String,
}
