//! 各认知领域得分计算
//!
//! 每个计算函数都接收整个窗口，自行按游戏类型过滤，返回 0-100 的整数。
//! 过滤结果为空时返回 0，不会报错。

use crate::engine::normalize::normalize;
use crate::engine::window::{ActivityWindow, mean};
use crate::models::{CognitiveScores, GameType};

/// 工作记忆最高关卡的取值范围
const MEMORY_LEVEL_RANGE: (f64, f64) = (1.0, 10.0);
const MEMORY_SCORE_RANGE: (f64, f64) = (0.0, 500.0);
const MEMORY_LEVEL_WEIGHT: f64 = 0.7;
const MEMORY_SCORE_WEIGHT: f64 = 0.3;

const ATTENTION_SCORE_RANGE: (f64, f64) = (0.0, 300.0);
const FLEXIBILITY_SCORE_RANGE: (f64, f64) = (0.0, 250.0);

const MOOD_RANGE: (f64, f64) = (1.0, 5.0);
/// `5 - fatigue` 的取值范围
const REST_RANGE: (f64, f64) = (0.0, 4.0);
const MOOD_WEIGHT: f64 = 0.6;
const REST_WEIGHT: f64 = 0.4;

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn average_score(window: &ActivityWindow, game_type: GameType) -> Option<f64> {
    mean(window.sessions_of(game_type).map(|s| s.score as f64))
}

/// 记忆得分：最高关卡占 70%，平均分占 30%
pub fn memory_score(window: &ActivityWindow) -> u8 {
    let Some(avg_score) = average_score(window, GameType::MemoryWork) else {
        return 0;
    };
    let max_level = window
        .sessions_of(GameType::MemoryWork)
        .map(|s| s.level)
        .max()
        .unwrap_or(0) as f64;

    to_score(
        normalize(max_level, MEMORY_LEVEL_RANGE.0, MEMORY_LEVEL_RANGE.1) * MEMORY_LEVEL_WEIGHT
            + normalize(avg_score, MEMORY_SCORE_RANGE.0, MEMORY_SCORE_RANGE.1)
                * MEMORY_SCORE_WEIGHT,
    )
}

/// 注意力得分：Stroop 平均分
pub fn attention_score(window: &ActivityWindow) -> u8 {
    average_score(window, GameType::AttentionStroop)
        .map(|avg| to_score(normalize(avg, ATTENTION_SCORE_RANGE.0, ATTENTION_SCORE_RANGE.1)))
        .unwrap_or(0)
}

/// 灵活性得分：规则切换游戏平均分
pub fn flexibility_score(window: &ActivityWindow) -> u8 {
    average_score(window, GameType::FlexibilityShift)
        .map(|avg| {
            to_score(normalize(
                avg,
                FLEXIBILITY_SCORE_RANGE.0,
                FLEXIBILITY_SCORE_RANGE.1,
            ))
        })
        .unwrap_or(0)
}

/// 健康得分：平均情绪占 60%，`5 - 平均疲劳` 占 40%
pub fn wellness_score(window: &ActivityWindow) -> u8 {
    let logs = window.logs();
    let (Some(avg_mood), Some(avg_fatigue)) = (
        mean(logs.iter().map(|log| log.mood as f64)),
        mean(logs.iter().map(|log| log.fatigue as f64)),
    ) else {
        return 0;
    };

    to_score(
        normalize(avg_mood, MOOD_RANGE.0, MOOD_RANGE.1) * MOOD_WEIGHT
            + normalize(5.0 - avg_fatigue, REST_RANGE.0, REST_RANGE.1) * REST_WEIGHT,
    )
}

/// 计算全部领域得分
///
/// 灵活性仅在窗口内存在对应游戏记录时给出。
pub fn compute_scores(window: &ActivityWindow) -> CognitiveScores {
    let has_flexibility = window.sessions_of(GameType::FlexibilityShift).next().is_some();

    CognitiveScores {
        memory: memory_score(window),
        attention: attention_score(window),
        wellness: wellness_score(window),
        flexibility: has_flexibility.then(|| flexibility_score(window)),
    }
}
