//! 存储工厂模块
//!
//! 根据配置创建仓储集合，进程内只创建一次。

use std::sync::Arc;
use tracing::info;

use crate::config::config::{DatabaseConfig, StorageBackend};
use crate::error::Result;
use crate::storage::memory::MemoryStore;
use crate::storage::repository::Repositories;

#[cfg(feature = "surrealdb")]
use crate::storage::surrealdb::SurrealStore;

/// 存储工厂
pub struct StorageFactory;

impl StorageFactory {
    /// 根据配置创建仓储集合
    pub async fn create(config: &DatabaseConfig) -> Result<Repositories> {
        info!("Initializing {} storage backend", config.backend);
        match config.backend {
            StorageBackend::Memory => Ok(Repositories::from_store(Arc::new(MemoryStore::new()))),
            StorageBackend::Surrealdb => Self::create_surrealdb(config).await,
        }
    }

    #[cfg(feature = "surrealdb")]
    async fn create_surrealdb(config: &DatabaseConfig) -> Result<Repositories> {
        let store = SurrealStore::connect(config).await?;
        Ok(Repositories::from_store(Arc::new(store)))
    }

    #[cfg(not(feature = "surrealdb"))]
    async fn create_surrealdb(_config: &DatabaseConfig) -> Result<Repositories> {
        Err(crate::error::AppError::Config(
            "SurrealDB feature is not enabled. Enable 'surrealdb' feature or use the memory backend."
                .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::DailyLogRepository;

    #[tokio::test]
    async fn test_memory_backend() {
        let config = DatabaseConfig {
            backend: StorageBackend::Memory,
            ..DatabaseConfig::default()
        };
        let repos = StorageFactory::create(&config).await.unwrap();
        assert_eq!(repos.logs.count_all_logs().await.unwrap(), 0);
    }
}
