use crate::config::config::{AppConfig, StorageBackend};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 环境变量前缀
const ENV_PREFIX: &str = "NEUROSYNC_";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序：
    /// 1. 开发环境默认值
    /// 2. ./neurosync.toml
    /// 3. 环境变量（`NEUROSYNC_` 前缀，`__` 分隔层级）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::development()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.database.backend == StorageBackend::Surrealdb && config.database.url.is_empty()
        {
            return Err(ConfigValidationError::MissingDatabaseUrl);
        }

        if config.engine.profile_window_days <= 0
            || config.engine.insight_window_days <= 0
            || config.engine.report_window_days <= 0
        {
            return Err(ConfigValidationError::InvalidWindow);
        }

        if config.llm.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidLlmTimeout);
        }

        if !config.is_development() && config.security.jwt_secret.len() < 32 {
            return Err(ConfigValidationError::WeakJwtSecret);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("数据库连接 URL 未配置")]
    MissingDatabaseUrl,

    #[error("统计窗口无效，必须大于 0 天")]
    InvalidWindow,

    #[error("语言模型超时无效，必须大于 0 秒")]
    InvalidLlmTimeout,

    #[error("JWT 密钥长度不足 32 字符")]
    WeakJwtSecret,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("neurosync.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("does-not-exist.toml")?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.engine.profile_window_days, 30);
            assert_eq!(config.engine.insight_window_days, 7);
            assert!(ConfigLoader::validate(&config).is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "neurosync.toml",
                r#"
                [engine]
                min_profile_logs = 3
                min_profile_sessions = 5

                [llm]
                timeout_seconds = 5
                "#,
            )?;
            let config = ConfigLoader::load()?;
            assert_eq!(config.engine.min_profile_logs, 3);
            assert_eq!(config.engine.min_profile_sessions, 5);
            assert_eq!(config.engine.profile_window_days, 30);
            assert_eq!(config.llm.timeout_seconds, 5);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("neurosync.toml", "[server]\nport = 9000\n")?;
            jail.set_env("NEUROSYNC_SERVER__PORT", "9100");
            let config = ConfigLoader::load()?;
            assert_eq!(config.server.port, 9100);
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::development();
        config.server.port = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidPort)
        );

        let config = AppConfig::production();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::WeakJwtSecret)
        );
    }

    #[test]
    fn test_validate_rejects_empty_report_window_and_llm_timeout() {
        let mut config = AppConfig::development();
        config.engine.report_window_days = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidWindow)
        );

        let mut config = AppConfig::development();
        config.llm.timeout_seconds = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidLlmTimeout)
        );

        assert_eq!(ConfigLoader::validate(&AppConfig::development()), Ok(()));
    }
}
