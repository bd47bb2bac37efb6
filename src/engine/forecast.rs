//! 每日预测
//!
//! 基于当天的一次签到，按顺序匹配规则，首条命中即返回。

use serde::{Deserialize, Serialize};

use crate::models::CheckInEntry;

/// 预测结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Forecast {
    /// 命中的规则名
    pub rule: String,
    /// 给用户看的预测文本
    pub prediction: String,
}

type ForecastRule = (&'static str, fn(&CheckInEntry) -> bool, &'static str);

fn short_sleep(entry: &CheckInEntry) -> bool {
    entry.sleep_hours < 6.0
}

fn low_mood_high_fatigue(entry: &CheckInEntry) -> bool {
    entry.mood <= 2 && entry.fatigue >= 4
}

fn all_positive(entry: &CheckInEntry) -> bool {
    entry.mood >= 4 && entry.fatigue <= 2 && entry.sleep_hours >= 7.0
}

const RULES: &[ForecastRule] = &[
    (
        "short_sleep",
        short_sleep,
        "You slept little last night, so your focus may dip today. \
         Consider a short nap or a meditation session to recharge.",
    ),
    (
        "low_mood_high_fatigue",
        low_mood_high_fatigue,
        "You seem to be starting the day tired and low. Be kind to yourself: \
         a light exercise routine could help lift your state.",
    ),
    (
        "all_positive",
        all_positive,
        "Every indicator looks positive! Today could be a high-performance day, make the most of it.",
    ),
];

/// 返回第一条命中规则的预测；没有规则命中时返回 `None`
pub fn forecast(entry: &CheckInEntry) -> Option<Forecast> {
    RULES
        .iter()
        .find(|(_, matches, _)| matches(entry))
        .map(|(rule, _, prediction)| Forecast {
            rule: rule.to_string(),
            prediction: prediction.to_string(),
        })
}
