//! 内存存储
//!
//! 基于 `DashMap`，用于测试和 `memory` 后端。进程退出即丢失数据。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use crate::error::{AppError, Result};
use crate::models::{CheckInEntry, DailyLog, GameSession, User};
use crate::security::rbac::Role;
use crate::storage::repository::{DailyLogRepository, GameSessionRepository, UserRepository};

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    /// 键为 `DailyLog::key_for(user, date)`
    logs: DashMap<String, DailyLog>,
    sessions: DashMap<String, GameSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_logs(&self, user_id: &str) -> Vec<DailyLog> {
        let mut logs: Vec<DailyLog> = self
            .logs
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        logs.sort_by_key(|log| log.date);
        logs
    }

    fn user_sessions(&self, user_id: &str) -> Vec<GameSession> {
        let mut sessions: Vec<GameSession> = self
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by_key(|session| session.created_at);
        sessions
    }
}

/// 保留末尾 `limit` 个元素
fn tail<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(limit);
    items.drain(..skip);
    items
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.value().clone())
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64> {
        Ok(self.users.iter().filter(|u| u.role == role).count() as u64)
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        Ok(self.users.remove(id).is_some())
    }
}

#[async_trait]
impl DailyLogRepository for MemoryStore {
    async fn upsert_log(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: &CheckInEntry,
        now: DateTime<Utc>,
    ) -> Result<DailyLog> {
        let key = DailyLog::key_for(user_id, date);
        let mut slot = self
            .logs
            .entry(key)
            .or_insert_with(|| DailyLog::new(user_id, date, entry, now));
        slot.apply(entry, now);
        Ok(slot.value().clone())
    }

    async fn logs_since(&self, user_id: &str, since: NaiveDate) -> Result<Vec<DailyLog>> {
        Ok(self
            .user_logs(user_id)
            .into_iter()
            .filter(|log| log.date >= since)
            .collect())
    }

    async fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<DailyLog>> {
        Ok(tail(self.user_logs(user_id), limit))
    }

    async fn count_logs(&self, user_id: &str) -> Result<u64> {
        Ok(self.logs.iter().filter(|l| l.user_id == user_id).count() as u64)
    }

    async fn count_all_logs(&self) -> Result<u64> {
        Ok(self.logs.len() as u64)
    }

    async fn high_fatigue_logs(&self, threshold: u8, limit: usize) -> Result<Vec<DailyLog>> {
        let mut logs: Vec<DailyLog> = self
            .logs
            .iter()
            .filter(|l| l.fatigue >= threshold)
            .map(|l| l.value().clone())
            .collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date).then(b.updated_at.cmp(&a.updated_at)));
        logs.truncate(limit);
        Ok(logs)
    }

    async fn delete_logs_for_user(&self, user_id: &str) -> Result<u64> {
        let mut removed = 0u64;
        self.logs.retain(|_, log| {
            let keep = log.user_id != user_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

#[async_trait]
impl GameSessionRepository for MemoryStore {
    async fn create_session(&self, session: &GameSession) -> Result<GameSession> {
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(session.clone())
    }

    async fn sessions_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<GameSession>> {
        Ok(self
            .user_sessions(user_id)
            .into_iter()
            .filter(|s| s.created_at >= since)
            .collect())
    }

    async fn recent_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<GameSession>> {
        Ok(tail(self.user_sessions(user_id), limit))
    }

    async fn count_sessions(&self, user_id: &str) -> Result<u64> {
        Ok(self.sessions.iter().filter(|s| s.user_id == user_id).count() as u64)
    }

    async fn count_all_sessions(&self) -> Result<u64> {
        Ok(self.sessions.len() as u64)
    }

    async fn delete_sessions_for_user(&self, user_id: &str) -> Result<u64> {
        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            let keep = session.user_id != user_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
