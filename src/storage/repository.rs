//! 仓储接口
//!
//! 服务层只依赖这些 trait，具体实现由 [`StorageFactory`](super::factory::StorageFactory)
//! 在启动时创建一次并注入。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{CheckInEntry, DailyLog, GameSession, User};
use crate::security::rbac::Role;

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 创建用户，邮箱已存在时返回 `Conflict`
    async fn create_user(&self, user: &User) -> Result<User>;

    /// 根据 ID 获取用户
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// 按角色列出用户（按注册时间升序）
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>>;

    /// 按角色统计
    async fn count_by_role(&self, role: Role) -> Result<u64>;

    /// 删除用户
    async fn delete_user(&self, id: &str) -> Result<bool>;
}

/// 签到仓储
#[async_trait]
pub trait DailyLogRepository: Send + Sync {
    /// 写入当天签到，(用户, 日期) 已存在时覆盖
    async fn upsert_log(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: &CheckInEntry,
        now: DateTime<Utc>,
    ) -> Result<DailyLog>;

    /// `since` 当天及之后的签到，按日期升序
    async fn logs_since(&self, user_id: &str, since: NaiveDate) -> Result<Vec<DailyLog>>;

    /// 最近 `limit` 条签到，按日期升序
    async fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<DailyLog>>;

    /// 某用户的签到数
    async fn count_logs(&self, user_id: &str) -> Result<u64>;

    /// 全部签到数
    async fn count_all_logs(&self) -> Result<u64>;

    /// 疲劳度不低于 `threshold` 的签到，最新的在前
    async fn high_fatigue_logs(&self, threshold: u8, limit: usize) -> Result<Vec<DailyLog>>;

    /// 删除某用户的全部签到，返回删除条数
    async fn delete_logs_for_user(&self, user_id: &str) -> Result<u64>;
}

/// 游戏记录仓储
#[async_trait]
pub trait GameSessionRepository: Send + Sync {
    /// 保存一局游戏
    async fn create_session(&self, session: &GameSession) -> Result<GameSession>;

    /// `since` 之后完成的游戏，按时间升序
    async fn sessions_since(&self, user_id: &str, since: DateTime<Utc>)
    -> Result<Vec<GameSession>>;

    /// 最近 `limit` 局游戏，按时间升序
    async fn recent_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<GameSession>>;

    /// 某用户的游戏数
    async fn count_sessions(&self, user_id: &str) -> Result<u64>;

    /// 全部游戏数
    async fn count_all_sessions(&self) -> Result<u64>;

    /// 删除某用户的全部游戏记录，返回删除条数
    async fn delete_sessions_for_user(&self, user_id: &str) -> Result<u64>;
}

/// 进程级共享的仓储集合
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub logs: Arc<dyn DailyLogRepository>,
    pub sessions: Arc<dyn GameSessionRepository>,
}

impl Repositories {
    /// 由同时实现三个仓储的存储创建
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + DailyLogRepository + GameSessionRepository + 'static,
    {
        Self {
            users: store.clone(),
            logs: store.clone(),
            sessions: store,
        }
    }

    /// 内存存储（测试与 `memory` 后端）
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(super::memory::MemoryStore::new()))
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
