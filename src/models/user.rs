use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::rbac::Role;

/// 用户账户
///
/// 仅保存身份信息，不保存任何口令材料。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// 用户唯一标识
    pub id: String,
    /// 邮箱（小写）
    pub email: String,
    /// 角色
    pub role: Role,
    /// 注册时间
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 创建新用户，邮箱统一转为小写
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            role,
            created_at: Utc::now(),
        }
    }

    /// 使用指定 ID 创建用户
    pub fn with_id(id: &str, email: &str, role: Role) -> Self {
        let mut user = Self::new(email, role);
        user.id = id.to_string();
        user
    }

    /// 是否为患者账户
    pub fn is_patient(&self) -> bool {
        self.role == Role::Patient
    }
}
