//! 存储层模块
//!
//! 仓储 trait 及其内存、SurrealDB 实现。

pub mod factory;
pub mod memory;
pub mod repository;

#[cfg(feature = "surrealdb")]
pub mod surrealdb;

pub use factory::StorageFactory;
pub use memory::MemoryStore;
pub use repository::{DailyLogRepository, GameSessionRepository, Repositories, UserRepository};
