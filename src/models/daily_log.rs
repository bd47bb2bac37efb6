use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::security::validation::{Validatable, ValidationResult, validators};

/// 每日签到记录
///
/// 每个用户每个自然日（UTC）至多一条，重复签到覆盖当天记录。
///
/// `fatigue` 表示疲劳程度：1 = 精力充沛，5 = 极度疲惫。
/// 健康分中的 `5 - fatigue` 反转和临床端的高疲劳告警都依赖这一约定。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLog {
    /// 记录标识（用户 + 日期）
    pub id: String,
    /// 所属用户
    pub user_id: String,
    /// 签到日期（不含时间）
    pub date: NaiveDate,
    /// 睡眠时长（小时）
    pub sleep_hours: f64,
    /// 情绪 1-5
    pub mood: u8,
    /// 疲劳 1-5
    pub fatigue: u8,
    /// 首次签到时间
    pub created_at: DateTime<Utc>,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
}

impl DailyLog {
    /// 根据签到内容创建当天记录
    pub fn new(user_id: &str, date: NaiveDate, entry: &CheckInEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::key_for(user_id, date),
            user_id: user_id.to_string(),
            date,
            sleep_hours: entry.sleep_hours,
            mood: entry.mood,
            fatigue: entry.fatigue,
            created_at: now,
            updated_at: now,
        }
    }

    /// (用户, 日期) 唯一键
    pub fn key_for(user_id: &str, date: NaiveDate) -> String {
        format!("{}_{}", user_id, date.format("%Y%m%d"))
    }

    /// 用新的签到内容覆盖当天记录，保留创建时间
    pub fn apply(&mut self, entry: &CheckInEntry, now: DateTime<Utc>) {
        self.sleep_hours = entry.sleep_hours;
        self.mood = entry.mood;
        self.fatigue = entry.fatigue;
        self.updated_at = now;
    }
}

/// 签到内容
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CheckInEntry {
    pub sleep_hours: f64,
    pub mood: u8,
    pub fatigue: u8,
}

impl Validatable for CheckInEntry {
    fn validate(&self) -> ValidationResult<()> {
        validators::validate_sleep_hours(self.sleep_hours)?;
        validators::validate_scale("mood", self.mood)?;
        validators::validate_scale("fatigue", self.fatigue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(sleep_hours: f64, mood: u8, fatigue: u8) -> CheckInEntry {
        CheckInEntry {
            sleep_hours,
            mood,
            fatigue,
        }
    }

    #[test]
    fn test_key_is_stable_per_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(DailyLog::key_for("u1", date), "u1_20260309");
    }

    #[test]
    fn test_apply_keeps_creation_time() {
        let first = Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 3, 9, 21, 0, 0).unwrap();
        let mut log = DailyLog::new("u1", first.date_naive(), &entry(6.0, 2, 4), first);

        log.apply(&entry(8.0, 4, 2), later);

        assert_eq!(log.mood, 4);
        assert_eq!(log.fatigue, 2);
        assert_eq!(log.sleep_hours, 8.0);
        assert_eq!(log.created_at, first);
        assert_eq!(log.updated_at, later);
    }

    #[test]
    fn test_entry_validation() {
        assert!(entry(7.5, 3, 3).validate().is_ok());
        assert!(entry(7.5, 0, 3).validate().is_err());
        assert!(entry(7.5, 3, 6).validate().is_err());
        assert!(entry(-1.0, 3, 3).validate().is_err());
        assert!(entry(f64::NAN, 3, 3).validate().is_err());
    }
}
