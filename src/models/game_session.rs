use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::security::validation::{Validatable, ValidationError, ValidationResult};

/// 小游戏类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    /// 工作记忆（复现方块序列）
    MemoryWork,
    /// 选择性注意（Stroop 测试）
    AttentionStroop,
    /// 认知灵活性（规则切换）
    FlexibilityShift,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::MemoryWork => write!(f, "MEMORY_WORK"),
            GameType::AttentionStroop => write!(f, "ATTENTION_STROOP"),
            GameType::FlexibilityShift => write!(f, "FLEXIBILITY_SHIFT"),
        }
    }
}

/// 游戏记录
///
/// 每完成一局生成一条，创建后不可修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSession {
    /// 记录唯一标识
    pub id: String,
    /// 所属用户
    pub user_id: String,
    /// 游戏类型
    pub game_type: GameType,
    /// 得分
    pub score: u32,
    /// 达到的关卡（仅工作记忆游戏有意义）
    pub level: u32,
    /// 游戏时长（秒）
    pub duration_seconds: Option<u32>,
    /// 完成时间
    pub created_at: DateTime<Utc>,
}

impl GameSession {
    /// 创建新记录
    pub fn new(user_id: &str, new_session: &NewGameSession, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_type: new_session.game_type,
            score: new_session.score,
            level: new_session.level,
            duration_seconds: new_session.duration_seconds,
            created_at,
        }
    }
}

/// 新游戏记录请求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGameSession {
    pub game_type: GameType,
    pub score: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

fn default_level() -> u32 {
    1
}

impl Validatable for NewGameSession {
    fn validate(&self) -> ValidationResult<()> {
        if self.level < 1 {
            return Err(ValidationError::BelowMin {
                field: "level".to_string(),
                min: 1,
                got: self.level as i64,
            });
        }
        if self.duration_seconds == Some(0) {
            return Err(ValidationError::NotPositive {
                field: "duration_seconds".to_string(),
            });
        }
        Ok(())
    }
}
