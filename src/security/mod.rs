//! Security Module
//!
//! Security features for the NeuroSync API:
//! - Authentication (API Key + JWT), producing a typed [`Principal`]
//! - Authorization (closed `Role` enum and per-role permissions)
//! - Request Validation
//! - Security Middleware

pub mod auth;
pub mod middleware;
pub mod rbac;
pub mod validation;

pub use auth::{ApiKeyAuth, Authenticator, CombinedAuthenticator, Credentials, JwtAuth};
pub use rbac::{Permission, Principal, Role};
pub use validation::{RequestValidator, Validatable, ValidationError};
