//! 活动服务
//!
//! 患者端的写操作（签到、保存游戏记录、删除账户）以及仪表盘和周报。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::config::EngineConfig;
use crate::engine::{self, Forecast};
use crate::error::Result;
use crate::models::{CheckInEntry, DailyLog, GameSession, NewGameSession};
use crate::security::validation::Validatable;
use crate::services::narrator::Narrator;
use crate::services::profile_service::load_window;
use crate::storage::repository::{
    DailyLogRepository, GameSessionRepository, Repositories, UserRepository,
};

/// 签到结果：当天记录和可选的每日预测
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckInOutcome {
    pub log: DailyLog,
    pub forecast: Option<Forecast>,
}

/// 仪表盘数据（均按时间升序）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub logs: Vec<DailyLog>,
    pub sessions: Vec<GameSession>,
}

/// 账户删除结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountDeletion {
    pub user_removed: bool,
    pub logs_removed: u64,
    pub sessions_removed: u64,
}

/// 活动服务 trait
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// 写入今天的签到（同一天重复签到覆盖）
    async fn check_in(&self, user_id: &str, entry: CheckInEntry) -> Result<CheckInOutcome>;

    /// 保存一局游戏
    async fn record_session(&self, user_id: &str, request: NewGameSession)
    -> Result<GameSession>;

    /// 最近的签到和游戏记录
    async fn dashboard(&self, user_id: &str) -> Result<Dashboard>;

    /// 最近 7 天的叙述周报
    async fn weekly_report(&self, user_id: &str) -> Result<String>;

    /// 删除账户及其全部记录
    async fn delete_account(&self, user_id: &str) -> Result<AccountDeletion>;
}

/// 活动服务实现
pub struct ActivityServiceImpl {
    repos: Repositories,
    narrator: Arc<Narrator>,
    config: EngineConfig,
}

impl ActivityServiceImpl {
    pub fn new(repos: Repositories, narrator: Arc<Narrator>, config: EngineConfig) -> Self {
        Self {
            repos,
            narrator,
            config,
        }
    }

    pub async fn check_in_at(
        &self,
        user_id: &str,
        entry: CheckInEntry,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        entry.validate()?;

        let log = self
            .repos
            .logs
            .upsert_log(user_id, now.date_naive(), &entry, now)
            .await?;
        debug!("Check-in stored for {} on {}", user_id, log.date);

        Ok(CheckInOutcome {
            log,
            forecast: engine::forecast(&entry),
        })
    }

    pub async fn record_session_at(
        &self,
        user_id: &str,
        request: NewGameSession,
        now: DateTime<Utc>,
    ) -> Result<GameSession> {
        request.validate()?;
        let session = GameSession::new(user_id, &request, now);
        self.repos.sessions.create_session(&session).await
    }

    pub async fn weekly_report_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String> {
        let window = load_window(&self.repos, user_id, now, self.config.report_window_days).await?;
        Ok(self.narrator.weekly_report(&window).await)
    }
}

#[async_trait]
impl ActivityService for ActivityServiceImpl {
    async fn check_in(&self, user_id: &str, entry: CheckInEntry) -> Result<CheckInOutcome> {
        self.check_in_at(user_id, entry, Utc::now()).await
    }

    async fn record_session(
        &self,
        user_id: &str,
        request: NewGameSession,
    ) -> Result<GameSession> {
        self.record_session_at(user_id, request, Utc::now()).await
    }

    async fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        let (logs, sessions) = tokio::try_join!(
            self.repos
                .logs
                .recent_logs(user_id, self.config.dashboard_log_limit),
            self.repos
                .sessions
                .recent_sessions(user_id, self.config.dashboard_session_limit),
        )?;
        Ok(Dashboard { logs, sessions })
    }

    async fn weekly_report(&self, user_id: &str) -> Result<String> {
        self.weekly_report_at(user_id, Utc::now()).await
    }

    async fn delete_account(&self, user_id: &str) -> Result<AccountDeletion> {
        let logs_removed = self.repos.logs.delete_logs_for_user(user_id).await?;
        let sessions_removed = self.repos.sessions.delete_sessions_for_user(user_id).await?;
        let user_removed = self.repos.users.delete_user(user_id).await?;

        info!(
            "Deleted account {} ({} logs, {} sessions)",
            user_id, logs_removed, sessions_removed
        );
        Ok(AccountDeletion {
            user_removed,
            logs_removed,
            sessions_removed,
        })
    }
}

/// 创建活动服务
pub fn create_activity_service(
    repos: Repositories,
    narrator: Arc<Narrator>,
    config: EngineConfig,
) -> Arc<dyn ActivityService> {
    Arc::new(ActivityServiceImpl::new(repos, narrator, config))
}
