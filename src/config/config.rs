use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::security::rbac::Role;

/// 存储后端类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内存储（开发与测试）
    #[default]
    Memory,
    /// SurrealDB 嵌入式/远程存储
    Surrealdb,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Surrealdb => write!(f, "surrealdb"),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 存储后端
    pub backend: StorageBackend,
    /// SurrealDB 连接地址
    pub url: String,
    /// 命名空间
    pub namespace: String,
    /// 数据库名称
    pub database: String,
    /// 用户名（为空时跳过登录）
    pub username: String,
    /// 密码
    pub password: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 请求超时（秒）
    pub request_timeout: u64,
    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

/// 语言模型服务配置
///
/// 任意兼容 OpenAI Chat Completions 协议的端点均可使用。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// API 基础地址
    pub base_url: String,
    /// API 密钥
    pub api_key: String,
    /// 画像总结、周报使用的模型
    pub summary_model: String,
    /// 反馈、每日内容、教练对话使用的模型
    pub fast_model: String,
    /// 签到文本分析使用的模型
    pub analysis_model: String,
    /// 请求超时（秒）
    pub timeout_seconds: u64,
}

/// 评分引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 认知画像回溯窗口（天）
    pub profile_window_days: i64,
    /// 洞察回溯窗口（天）
    pub insight_window_days: i64,
    /// 周报回溯窗口（天）
    pub report_window_days: i64,
    /// 生成画像所需最少日志数
    pub min_profile_logs: usize,
    /// 生成画像所需最少游戏记录数
    pub min_profile_sessions: usize,
    /// 仪表盘返回的日志数量上限
    pub dashboard_log_limit: usize,
    /// 仪表盘返回的游戏记录数量上限
    pub dashboard_session_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile_window_days: 30,
            insight_window_days: 7,
            report_window_days: 7,
            min_profile_logs: 1,
            min_profile_sessions: 1,
            dashboard_log_limit: 30,
            dashboard_session_limit: 50,
        }
    }
}

/// API Key 绑定的身份
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKeyBinding {
    /// 用户 ID
    pub user_id: String,
    /// 角色
    pub role: Role,
}

/// 安全配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// JWT 签名密钥
    pub jwt_secret: String,
    /// JWT 签发者
    pub jwt_issuer: String,
    /// JWT 受众
    pub jwt_audience: String,
    /// 静态 API Key（key -> 身份）
    pub api_keys: HashMap<String, ApiKeyBinding>,
    /// CORS 允许的来源
    pub cors_allowed_origins: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录
    pub log_dir: Option<PathBuf>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 服务器配置
    pub server: ServerConfig,
    /// 语言模型配置
    pub llm: LlmConfig,
    /// 评分引擎配置
    pub engine: EngineConfig,
    /// 安全配置
    pub security: SecurityConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        let mut api_keys = HashMap::new();
        api_keys.insert(
            "dev-patient-key".to_string(),
            ApiKeyBinding {
                user_id: "dev-patient".into(),
                role: Role::Patient,
            },
        );
        api_keys.insert(
            "dev-admin-key".to_string(),
            ApiKeyBinding {
                user_id: "dev-admin".into(),
                role: Role::Admin,
            },
        );

        Self {
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: "rocksdb://./data/neurosync".into(),
                namespace: "neurosync".into(),
                database: "activity".into(),
                username: String::new(),
                password: String::new(),
            },
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
                request_timeout: 30,
                max_request_size: 1024 * 1024,
            },
            llm: LlmConfig {
                base_url: "https://api.groq.com/openai/v1".into(),
                api_key: String::new(),
                summary_model: "openai/gpt-oss-20b".into(),
                fast_model: "openai/gpt-oss-20b".into(),
                analysis_model: "llama-3.3-70b-versatile".into(),
                timeout_seconds: 20,
            },
            engine: EngineConfig::default(),
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-in-production-min-32-chars".into(),
                jwt_issuer: "neurosync".into(),
                jwt_audience: "neurosync-api".into(),
                api_keys,
                cors_allowed_origins: vec!["http://localhost:3000".into()],
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            app_name: "neurosync".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config.database.backend = StorageBackend::Surrealdb;
        config.security.jwt_secret = String::new();
        config.security.api_keys.clear();
        config
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
