//! Role-Based Access Control (RBAC) Module
//!
//! Roles are parsed exactly once, when a credential is turned into a
//! [`Principal`]. Everything downstream works with the closed [`Role`] enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Role enumeration for access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Clinician with access to every patient
    Admin,
    /// Regular user playing games and checking in
    Patient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Patient => write!(f, "patient"),
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "patient" | "user" => Ok(Role::Patient),
            other => Err(AppError::Authentication(format!("Unknown role: {}", other))),
        }
    }
}

impl Role {
    /// Check if role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Actions guarded by the access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// Read own logs, sessions, profile and insights
    ReadOwnActivity,
    /// Check in, record sessions, delete own account
    WriteOwnActivity,
    /// Use the LLM coach endpoints
    UseCoach,
    /// Read any patient's records and aggregates
    ReadPatientRecords,
    /// Enrol patients
    ManagePatients,
}

/// Default permissions for each role
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => &[
            Permission::ReadOwnActivity,
            Permission::UseCoach,
            Permission::ReadPatientRecords,
            Permission::ManagePatients,
        ],
        Role::Patient => &[
            Permission::ReadOwnActivity,
            Permission::WriteOwnActivity,
            Permission::UseCoach,
        ],
    }
}

/// Authenticated caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque user key
    pub user_id: String,
    /// Validated role
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Check whether the role grants a permission
    pub fn has(&self, permission: Permission) -> bool {
        role_permissions(self.role).contains(&permission)
    }

    /// Fail with `Authorization` unless the permission is granted
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Role '{}' lacks permission {:?}",
                self.role, permission
            )))
        }
    }
}
