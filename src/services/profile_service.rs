//! 认知画像服务
//!
//! 读取时间窗口内的签到与游戏记录（并发读取），交给评分引擎计算，
//! 再调用叙述生成器补充总结。每次请求都重新计算，不做缓存。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::config::config::EngineConfig;
use crate::engine::{self, ActivityWindow};
use crate::error::{AppError, Result};
use crate::models::CognitiveProfile;
use crate::services::narrator::Narrator;
use crate::storage::repository::{DailyLogRepository, GameSessionRepository, Repositories};

/// 画像服务 trait
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// 最近 30 天的认知画像；数据不足时返回 `InsufficientData`
    async fn cognitive_profile(&self, user_id: &str) -> Result<CognitiveProfile>;

    /// 最近 7 天的洞察，结果从不为空
    async fn insights(&self, user_id: &str) -> Result<Vec<String>>;
}

/// 读取 `[now - days, now]` 窗口内某用户的全部活动
pub(crate) async fn load_window(
    repos: &Repositories,
    user_id: &str,
    now: DateTime<Utc>,
    days: i64,
) -> Result<ActivityWindow> {
    let (logs, sessions) = tokio::try_join!(
        repos
            .logs
            .logs_since(user_id, ActivityWindow::start_date(now, days)),
        repos
            .sessions
            .sessions_since(user_id, ActivityWindow::start_instant(now, days)),
    )?;
    Ok(ActivityWindow::new(logs, sessions))
}

/// 画像服务实现
pub struct ProfileServiceImpl {
    repos: Repositories,
    narrator: Arc<Narrator>,
    config: EngineConfig,
}

impl ProfileServiceImpl {
    pub fn new(repos: Repositories, narrator: Arc<Narrator>, config: EngineConfig) -> Self {
        Self {
            repos,
            narrator,
            config,
        }
    }

    /// 以指定时刻为窗口终点计算画像
    pub async fn cognitive_profile_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CognitiveProfile> {
        let window = load_window(&self.repos, user_id, now, self.config.profile_window_days).await?;

        if window.log_count() < self.config.min_profile_logs
            || window.session_count() < self.config.min_profile_sessions
        {
            return Err(AppError::InsufficientData(format!(
                "Need at least {} check-in(s) and {} game session(s) in the last {} days, found {} and {}",
                self.config.min_profile_logs,
                self.config.min_profile_sessions,
                self.config.profile_window_days,
                window.log_count(),
                window.session_count()
            )));
        }

        let scores = engine::compute_scores(&window);
        debug!(
            "Scores for {}: memory={} attention={} wellness={} flexibility={:?}",
            user_id, scores.memory, scores.attention, scores.wellness, scores.flexibility
        );

        let summary = self.narrator.profile_summary(&scores).await;
        Ok(CognitiveProfile { scores, summary })
    }

    /// 以指定时刻为窗口终点生成洞察
    pub async fn insights_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<String>> {
        let window = load_window(&self.repos, user_id, now, self.config.insight_window_days).await?;
        Ok(engine::generate_insights(&window))
    }
}

#[async_trait]
impl ProfileService for ProfileServiceImpl {
    async fn cognitive_profile(&self, user_id: &str) -> Result<CognitiveProfile> {
        self.cognitive_profile_at(user_id, Utc::now()).await
    }

    async fn insights(&self, user_id: &str) -> Result<Vec<String>> {
        self.insights_at(user_id, Utc::now()).await
    }
}

/// 创建画像服务
pub fn create_profile_service(
    repos: Repositories,
    narrator: Arc<Narrator>,
    config: EngineConfig,
) -> Arc<dyn ProfileService> {
    Arc::new(ProfileServiceImpl::new(repos, narrator, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::AppConfig;
    use crate::engine::FALLBACK_INSIGHT;
    use crate::models::{CheckInEntry, GameSession, GameType, NewGameSession};
    use crate::services::llm::MockLlmClient;
    use crate::services::narrator::PROFILE_SUMMARY_FALLBACK;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap()
    }

    fn service(mock: MockLlmClient) -> (ProfileServiceImpl, Repositories) {
        let config = AppConfig::development();
        let repos = Repositories::in_memory();
        let narrator = Arc::new(Narrator::new(Arc::new(mock), &config.llm));
        (
            ProfileServiceImpl::new(repos.clone(), narrator, config.engine),
            repos,
        )
    }

    async fn check_in(repos: &Repositories, days_ago: i64, mood: u8, fatigue: u8) {
        let at = now() - Duration::days(days_ago);
        let entry = CheckInEntry {
            sleep_hours: 7.0,
            mood,
            fatigue,
        };
        repos
            .logs
            .upsert_log("u1", at.date_naive(), &entry, at)
            .await
            .unwrap();
    }

    async fn play(repos: &Repositories, days_ago: i64, game_type: GameType, score: u32, level: u32) {
        let request = NewGameSession {
            game_type,
            score,
            level,
            duration_seconds: None,
        };
        let session = GameSession::new("u1", &request, now() - Duration::days(days_ago));
        repos.sessions.create_session(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_data_is_insufficient_not_zero_scores() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete().times(0);
        let (service, _) = service(mock);

        let err = service.cognitive_profile_at("u1", now()).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn test_logs_without_sessions_is_insufficient() {
        let (service, repos) = service(MockLlmClient::new());
        check_in(&repos, 1, 4, 2).await;

        let err = service.cognitive_profile_at("u1", now()).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn test_records_outside_window_are_ignored() {
        let (service, repos) = service(MockLlmClient::new());
        check_in(&repos, 45, 4, 2).await;
        play(&repos, 45, GameType::MemoryWork, 100, 3).await;

        assert!(service.cognitive_profile_at("u1", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_profile_scores_with_summary_fallback() {
        let mut mock = MockLlmClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(AppError::Llm("unavailable".into())));
        let (service, repos) = service(mock);

        check_in(&repos, 2, 5, 1).await;
        play(&repos, 2, GameType::MemoryWork, 500, 10).await;
        play(&repos, 1, GameType::AttentionStroop, 150, 1).await;

        let profile = service.cognitive_profile_at("u1", now()).await.unwrap();
        assert_eq!(profile.scores.memory, 100);
        assert_eq!(profile.scores.attention, 50);
        assert_eq!(profile.scores.wellness, 100);
        assert_eq!(profile.scores.flexibility, None);
        assert_eq!(profile.summary, PROFILE_SUMMARY_FALLBACK);
    }

    #[tokio::test]
    async fn test_insights_use_seven_day_window() {
        let (service, repos) = service(MockLlmClient::new());
        for days_ago in [1, 2, 3, 4, 10] {
            check_in(&repos, days_ago, 3, 3).await;
        }

        let insights = service.insights_at("u1", now()).await.unwrap();
        assert_eq!(insights, vec![FALLBACK_INSIGHT.to_string()]);

        check_in(&repos, 5, 3, 3).await;
        let insights = service.insights_at("u1", now()).await.unwrap();
        assert!(insights[0].contains("5 times"));
    }
}
