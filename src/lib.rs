//! NeuroSync - 认知训练评分与洞察服务
//!
//! 根据每日签到（睡眠、情绪、疲劳）和小游戏成绩计算认知画像，
//! 生成基于规则的洞察和每日预测，并通过语言模型补充叙述性文本。

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;
