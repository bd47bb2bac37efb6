use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{DailyLog, GameSession, GameType};

/// 时间窗口内的不可变活动快照
///
/// 构造时按时间升序排序，之后只读。评分和洞察规则都基于同一个快照。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityWindow {
    logs: Vec<DailyLog>,
    sessions: Vec<GameSession>,
}

impl ActivityWindow {
    /// 创建快照（日志按日期升序，游戏按完成时间升序）
    pub fn new(mut logs: Vec<DailyLog>, mut sessions: Vec<GameSession>) -> Self {
        logs.sort_by_key(|log| log.date);
        sessions.sort_by_key(|session| session.created_at);
        Self { logs, sessions }
    }

    pub fn logs(&self) -> &[DailyLog] {
        &self.logs
    }

    pub fn sessions(&self) -> &[GameSession] {
        &self.sessions
    }

    pub fn log_count(&self) -> usize {
        self.logs.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.sessions.is_empty()
    }

    /// 某一游戏类型的记录
    pub fn sessions_of(&self, game_type: GameType) -> impl Iterator<Item = &GameSession> {
        self.sessions
            .iter()
            .filter(move |session| session.game_type == game_type)
    }

    /// 窗口起点：今天（UTC）往前 `days` 天
    pub fn start_date(now: DateTime<Utc>, days: i64) -> NaiveDate {
        (now - chrono::Duration::days(days)).date_naive()
    }

    /// 窗口起点时间戳
    pub fn start_instant(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        now - chrono::Duration::days(days)
    }
}

/// 平均值，空集合返回 `None`
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_window_sorts_ascending() {
        let window = ActivityWindow::new(
            vec![log(5, 7.0, 3, 3), log(2, 7.0, 3, 3)],
            vec![
                session(4, 9, GameType::MemoryWork, 10, 1),
                session(1, 9, GameType::MemoryWork, 20, 1),
            ],
        );
        assert_eq!(window.logs()[0].date, day(2));
        assert_eq!(window.sessions()[0].score, 20);
        assert_eq!(window.sessions_of(GameType::AttentionStroop).count(), 0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([1.0, 2.0, 3.0]), Some(2.0));
    }
}
