//! 数据模型模块
//!
//! 定义签到、游戏记录、用户和认知画像等核心实体。

pub mod cognitive;
pub mod daily_log;
pub mod game_session;
pub mod user;

pub use cognitive::{CognitiveProfile, CognitiveScores};
pub use daily_log::{CheckInEntry, DailyLog};
pub use game_session::{GameSession, GameType, NewGameSession};
pub use user::User;
