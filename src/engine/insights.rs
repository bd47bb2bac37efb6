//! 洞察规则
//!
//! 规则是一组有序的纯函数 `fn(&ActivityWindow) -> Option<String>`，
//! 按声明顺序逐条求值，互不短路。新增规则只需追加到 [`RULES`]。

use std::collections::HashSet;

use crate::engine::window::{ActivityWindow, mean};

/// 单条洞察规则
pub type InsightRule = fn(&ActivityWindow) -> Option<String>;

/// 没有任何规则命中时返回的唯一一条洞察
pub const FALLBACK_INSIGHT: &str =
    "Keep tracking your check-ins and games: new insights will appear as your history grows.";

const CONSISTENCY_MIN_LOGS: usize = 5;
const SLEEP_MIN_LOGS: usize = 3;
const SLEEP_MIN_SESSIONS: usize = 3;
const GOOD_SLEEP_HOURS: f64 = 7.5;
const SLEEP_UPLIFT: f64 = 1.1;
const MOOD_TREND_MIN_LOGS: usize = 4;

/// 默认规则集（顺序即输出顺序）
pub const RULES: &[(&str, InsightRule)] = &[
    ("consistency", consistency),
    ("sleep_performance", sleep_performance),
    ("mood_trend", mood_trend),
];

/// 规则 1：一周内签到不少于 5 次
pub fn consistency(window: &ActivityWindow) -> Option<String> {
    let count = window.log_count();
    (count >= CONSISTENCY_MIN_LOGS).then(|| {
        format!(
            "Excellent consistency! You have completed your check-in {} times in the last week.",
            count
        )
    })
}

/// 规则 2：睡眠充足日的游戏得分明显更高
///
/// 按自然日匹配，同一天的多局游戏都会计入。
pub fn sleep_performance(window: &ActivityWindow) -> Option<String> {
    if window.log_count() < SLEEP_MIN_LOGS || window.session_count() < SLEEP_MIN_SESSIONS {
        return None;
    }

    let good_sleep_days: HashSet<_> = window
        .logs()
        .iter()
        .filter(|log| log.sleep_hours >= GOOD_SLEEP_HOURS)
        .map(|log| log.date)
        .collect();

    let good_sleep_scores: Vec<f64> = window
        .sessions()
        .iter()
        .filter(|session| good_sleep_days.contains(&session.created_at.date_naive()))
        .map(|session| session.score as f64)
        .collect();

    if good_sleep_scores.len() <= 1 {
        return None;
    }

    let avg_good = mean(good_sleep_scores)?;
    let avg_all = mean(window.sessions().iter().map(|s| s.score as f64))?;

    (avg_all > 0.0 && avg_good > avg_all * SLEEP_UPLIFT).then(|| {
        "Interesting pattern: your scores tend to be higher on days after a good night's sleep. \
         Rest powers your mind!"
            .to_string()
    })
}

/// 规则 3：后半段平均情绪高于前半段
pub fn mood_trend(window: &ActivityWindow) -> Option<String> {
    let logs = window.logs();
    if logs.len() < MOOD_TREND_MIN_LOGS {
        return None;
    }

    let (first, second) = logs.split_at(logs.len() / 2);
    let first_mood = mean(first.iter().map(|log| log.mood as f64))?;
    let second_mood = mean(second.iter().map(|log| log.mood as f64))?;

    (second_mood > first_mood).then(|| {
        "Good news! Your average mood has been trending upwards recently. Keep it up!".to_string()
    })
}

/// 用指定规则集生成洞察，结果从不为空
pub fn generate_with(rules: &[(&str, InsightRule)], window: &ActivityWindow) -> Vec<String> {
    let insights: Vec<String> = rules.iter().filter_map(|(_, rule)| rule(window)).collect();

    if insights.is_empty() {
        vec![FALLBACK_INSIGHT.to_string()]
    } else {
        insights
    }
}

/// 用默认规则集生成洞察
pub fn generate_insights(window: &ActivityWindow) -> Vec<String> {
    generate_with(RULES, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::window::fixtures::{log, session};
    use crate::models::GameType;
    use rstest::rstest;

    fn logs_with_moods(moods: &[u8]) -> ActivityWindow {
        let logs = moods
            .iter()
            .enumerate()
            .map(|(i, mood)| log(i as u32 + 1, 7.0, *mood, 3))
            .collect();
        ActivityWindow::new(logs, Vec::new())
    }

    #[rstest]
    #[case(4, false)]
    #[case(5, true)]
    #[case(7, true)]
    fn test_consistency_threshold(#[case] count: usize, #[case] fires: bool) {
        let window = logs_with_moods(&vec![3; count]);
        let insight = consistency(&window);
        assert_eq!(insight.is_some(), fires);
        if let Some(text) = insight {
            assert!(text.contains(&count.to_string()));
        }
    }

    #[test]
    fn test_mood_trend_up_and_down() {
        assert!(mood_trend(&logs_with_moods(&[1, 1, 5, 5])).is_some());
        assert!(mood_trend(&logs_with_moods(&[5, 5, 1, 1])).is_none());
        assert!(mood_trend(&logs_with_moods(&[1, 5, 5])).is_none());
    }

    #[test]
    fn test_mood_trend_odd_split_puts_extra_in_second_half() {
        // split at 2: [1,2] vs [2,2,2]
        assert!(mood_trend(&logs_with_moods(&[1, 2, 2, 2, 2])).is_some());
    }

    #[test]
    fn test_sleep_performance_fires_on_good_sleep_days() {
        let window = ActivityWindow::new(
            vec![log(1, 8.0, 3, 3), log(2, 5.0, 3, 3), log(3, 5.0, 3, 3)],
            vec![
                session(1, 9, GameType::AttentionStroop, 200, 1),
                session(1, 18, GameType::AttentionStroop, 200, 1),
                session(2, 9, GameType::AttentionStroop, 50, 1),
                session(3, 9, GameType::AttentionStroop, 50, 1),
            ],
        );
        // good: 200, all: 125
        assert!(sleep_performance(&window).is_some());
    }

    #[test]
    fn test_sleep_performance_needs_more_than_one_matching_session() {
        let window = ActivityWindow::new(
            vec![log(1, 8.0, 3, 3), log(2, 5.0, 3, 3), log(3, 5.0, 3, 3)],
            vec![
                session(1, 9, GameType::AttentionStroop, 300, 1),
                session(2, 9, GameType::AttentionStroop, 10, 1),
                session(3, 9, GameType::AttentionStroop, 10, 1),
            ],
        );
        assert!(sleep_performance(&window).is_none());
    }

    #[test]
    fn test_sleep_performance_requires_strict_uplift() {
        // every session on a good-sleep day: avg_good == avg_all
        let window = ActivityWindow::new(
            vec![log(1, 8.0, 3, 3), log(2, 8.0, 3, 3), log(3, 8.0, 3, 3)],
            vec![
                session(1, 9, GameType::MemoryWork, 100, 2),
                session(2, 9, GameType::MemoryWork, 100, 2),
                session(3, 9, GameType::MemoryWork, 100, 2),
            ],
        );
        assert!(sleep_performance(&window).is_none());
    }

    #[test]
    fn test_sleep_performance_ignores_all_zero_scores() {
        let window = ActivityWindow::new(
            vec![log(1, 8.0, 3, 3), log(2, 8.0, 3, 3), log(3, 5.0, 3, 3)],
            vec![
                session(1, 9, GameType::MemoryWork, 0, 1),
                session(2, 9, GameType::MemoryWork, 0, 1),
                session(3, 9, GameType::MemoryWork, 0, 1),
            ],
        );
        assert!(sleep_performance(&window).is_none());
    }

    #[test]
    fn test_fallback_when_nothing_fires() {
        let insights = generate_insights(&ActivityWindow::default());
        assert_eq!(insights, vec![FALLBACK_INSIGHT.to_string()]);
    }

    #[test]
    fn test_output_follows_rule_order() {
        let insights = generate_insights(&logs_with_moods(&[1, 1, 1, 5, 5]));
        assert_eq!(insights.len(), 2);
        assert!(insights[0].contains("5 times"));
        assert!(insights[1].contains("mood"));
    }

    #[test]
    fn test_custom_rule_set_is_appendable() {
        fn always(_: &ActivityWindow) -> Option<String> {
            Some("extra".to_string())
        }
        let mut rules = RULES.to_vec();
        rules.push(("always", always as InsightRule));

        let insights = generate_with(&rules, &ActivityWindow::default());
        assert_eq!(insights, vec!["extra".to_string()]);
    }
}
