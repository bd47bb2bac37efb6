//! SurrealDB 存储
//!
//! 启动时建立一个共享连接，所有仓储方法复用它。记录主键由业务键构成，
//! 内容中另存一份 `key` 字段用于查询。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{Any, connect},
    opt::auth::Root,
};
use tracing::info;

use crate::config::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{CheckInEntry, DailyLog, GameSession, GameType, User};
use crate::security::rbac::Role;
use crate::storage::repository::{DailyLogRepository, GameSessionRepository, UserRepository};

const USER_TABLE: &str = "app_user";
const LOG_TABLE: &str = "daily_log";
const SESSION_TABLE: &str = "game_session";

/// SurrealDB 存储
#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Any>,
}

impl SurrealStore {
    /// 连接数据库并选择命名空间
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db: Surreal<Any> = connect(config.url.as_str()).await?;

        // 嵌入式引擎不需要认证
        if !config.username.is_empty() {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        info!(
            "Connected to SurrealDB at {} ({}/{})",
            config.url, config.namespace, config.database
        );
        Ok(Self { db })
    }

    async fn count(&self, query: &'static str, user_id: Option<&str>) -> Result<u64> {
        let mut request = self.db.query(query);
        if let Some(user_id) = user_id {
            request = request.bind(("user_id", user_id.to_string()));
        }
        let rows: Vec<CountRow> = request.await?.take(0)?;
        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

/// 用户记录（不含 SurrealDB 的 `id` 字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    key: String,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            key: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.key,
            email: record.email,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyLogRecord {
    key: String,
    user_id: String,
    /// `YYYY-MM-DD`，按字符串比较即按日期比较
    date: NaiveDate,
    sleep_hours: f64,
    mood: u8,
    fatigue: u8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&DailyLog> for DailyLogRecord {
    fn from(log: &DailyLog) -> Self {
        Self {
            key: log.id.clone(),
            user_id: log.user_id.clone(),
            date: log.date,
            sleep_hours: log.sleep_hours,
            mood: log.mood,
            fatigue: log.fatigue,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}

impl From<DailyLogRecord> for DailyLog {
    fn from(record: DailyLogRecord) -> Self {
        Self {
            id: record.key,
            user_id: record.user_id,
            date: record.date,
            sleep_hours: record.sleep_hours,
            mood: record.mood,
            fatigue: record.fatigue,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GameSessionRecord {
    key: String,
    user_id: String,
    game_type: GameType,
    score: u32,
    level: u32,
    duration_seconds: Option<u32>,
    created_at: DateTime<Utc>,
    /// 毫秒时间戳，用于范围查询和排序
    created_ms: i64,
}

impl From<&GameSession> for GameSessionRecord {
    fn from(session: &GameSession) -> Self {
        Self {
            key: session.id.clone(),
            user_id: session.user_id.clone(),
            game_type: session.game_type,
            score: session.score,
            level: session.level,
            duration_seconds: session.duration_seconds,
            created_at: session.created_at,
            created_ms: session.created_at.timestamp_millis(),
        }
    }
}

impl From<GameSessionRecord> for GameSession {
    fn from(record: GameSessionRecord) -> Self {
        Self {
            id: record.key,
            user_id: record.user_id,
            game_type: record.game_type,
            score: record.score,
            level: record.level,
            duration_seconds: record.duration_seconds,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for SurrealStore {
    async fn create_user(&self, user: &User) -> Result<User> {
        let existing: Vec<UserRecord> = self
            .db
            .query("SELECT * FROM app_user WHERE email = $email LIMIT 1")
            .bind(("email", user.email.clone()))
            .await?
            .take(0)?;
        if !existing.is_empty() {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        let created: Option<UserRecord> = self
            .db
            .create((USER_TABLE, user.id.as_str()))
            .content(UserRecord::from(user))
            .await?;

        created
            .map(User::from)
            .ok_or_else(|| AppError::Database(format!("Failed to create user: {}", user.id)))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let record: Option<UserRecord> = self.db.select((USER_TABLE, id)).await?;
        Ok(record.map(User::from))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>> {
        let records: Vec<UserRecord> = self
            .db
            .query("SELECT * FROM app_user WHERE role = $role ORDER BY created_at ASC")
            .bind(("role", role))
            .await?
            .take(0)?;
        Ok(records.into_iter().map(User::from).collect())
    }

    async fn count_by_role(&self, role: Role) -> Result<u64> {
        let rows: Vec<CountRow> = self
            .db
            .query("SELECT count() FROM app_user WHERE role = $role GROUP ALL")
            .bind(("role", role))
            .await?
            .take(0)?;
        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        let deleted: Option<UserRecord> = self.db.delete((USER_TABLE, id)).await?;
        Ok(deleted.is_some())
    }
}

#[async_trait]
impl DailyLogRepository for SurrealStore {
    async fn upsert_log(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: &CheckInEntry,
        now: DateTime<Utc>,
    ) -> Result<DailyLog> {
        let key = DailyLog::key_for(user_id, date);
        let existing: Option<DailyLogRecord> = self.db.select((LOG_TABLE, key.as_str())).await?;

        let log = match existing {
            Some(record) => {
                let mut log = DailyLog::from(record);
                log.apply(entry, now);
                log
            }
            None => DailyLog::new(user_id, date, entry, now),
        };

        let saved: Option<DailyLogRecord> = self
            .db
            .upsert((LOG_TABLE, key.as_str()))
            .content(DailyLogRecord::from(&log))
            .await?;

        saved
            .map(DailyLog::from)
            .ok_or_else(|| AppError::Database(format!("Failed to upsert daily log: {}", key)))
    }

    async fn logs_since(&self, user_id: &str, since: NaiveDate) -> Result<Vec<DailyLog>> {
        let records: Vec<DailyLogRecord> = self
            .db
            .query(
                "SELECT * FROM daily_log WHERE user_id = $user_id AND date >= $since \
                 ORDER BY date ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("since", since.format("%Y-%m-%d").to_string()))
            .await?
            .take(0)?;
        Ok(records.into_iter().map(DailyLog::from).collect())
    }

    async fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<DailyLog>> {
        let records: Vec<DailyLogRecord> = self
            .db
            .query("SELECT * FROM daily_log WHERE user_id = $user_id ORDER BY date DESC LIMIT $limit")
            .bind(("user_id", user_id.to_string()))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        let mut logs: Vec<DailyLog> = records.into_iter().map(DailyLog::from).collect();
        logs.reverse();
        Ok(logs)
    }

    async fn count_logs(&self, user_id: &str) -> Result<u64> {
        self.count(
            "SELECT count() FROM daily_log WHERE user_id = $user_id GROUP ALL",
            Some(user_id),
        )
        .await
    }

    async fn count_all_logs(&self) -> Result<u64> {
        self.count("SELECT count() FROM daily_log GROUP ALL", None)
            .await
    }

    async fn high_fatigue_logs(&self, threshold: u8, limit: usize) -> Result<Vec<DailyLog>> {
        let records: Vec<DailyLogRecord> = self
            .db
            .query(
                "SELECT * FROM daily_log WHERE fatigue >= $threshold \
                 ORDER BY date DESC, updated_at DESC LIMIT $limit",
            )
            .bind(("threshold", threshold))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(records.into_iter().map(DailyLog::from).collect())
    }

    async fn delete_logs_for_user(&self, user_id: &str) -> Result<u64> {
        let deleted: Vec<DailyLogRecord> = self
            .db
            .query("DELETE daily_log WHERE user_id = $user_id RETURN BEFORE")
            .bind(("user_id", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(deleted.len() as u64)
    }
}

#[async_trait]
impl GameSessionRepository for SurrealStore {
    async fn create_session(&self, session: &GameSession) -> Result<GameSession> {
        let created: Option<GameSessionRecord> = self
            .db
            .create((SESSION_TABLE, session.id.as_str()))
            .content(GameSessionRecord::from(session))
            .await?;

        created.map(GameSession::from).ok_or_else(|| {
            AppError::Database(format!("Failed to create game session: {}", session.id))
        })
    }

    async fn sessions_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<GameSession>> {
        let records: Vec<GameSessionRecord> = self
            .db
            .query(
                "SELECT * FROM game_session WHERE user_id = $user_id AND created_ms >= $since \
                 ORDER BY created_ms ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("since", since.timestamp_millis()))
            .await?
            .take(0)?;
        Ok(records.into_iter().map(GameSession::from).collect())
    }

    async fn recent_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<GameSession>> {
        let records: Vec<GameSessionRecord> = self
            .db
            .query(
                "SELECT * FROM game_session WHERE user_id = $user_id \
                 ORDER BY created_ms DESC LIMIT $limit",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        let mut sessions: Vec<GameSession> = records.into_iter().map(GameSession::from).collect();
        sessions.reverse();
        Ok(sessions)
    }

    async fn count_sessions(&self, user_id: &str) -> Result<u64> {
        self.count(
            "SELECT count() FROM game_session WHERE user_id = $user_id GROUP ALL",
            Some(user_id),
        )
        .await
    }

    async fn count_all_sessions(&self) -> Result<u64> {
        self.count("SELECT count() FROM game_session GROUP ALL", None)
            .await
    }

    async fn delete_sessions_for_user(&self, user_id: &str) -> Result<u64> {
        let deleted: Vec<GameSessionRecord> = self
            .db
            .query("DELETE game_session WHERE user_id = $user_id RETURN BEFORE")
            .bind(("user_id", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(deleted.len() as u64)
    }
}
