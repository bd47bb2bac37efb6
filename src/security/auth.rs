//! Authentication Module
//!
//! Turns request credentials into a [`Principal`]:
//! - API Key authentication (static keys bound to a user and role)
//! - JWT (JSON Web Token) authentication
//!
//! Tokens are minted by an external identity provider; [`JwtTokenGenerator`]
//! exists for development tooling and tests.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::config::{ApiKeyBinding, SecurityConfig};
use crate::error::{AppError, Result};
use crate::security::rbac::{Principal, Role};

/// Credentials for authentication
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// API key (if provided)
    pub api_key: Option<String>,
    /// JWT token (if provided)
    pub jwt_token: Option<String>,
}

impl Credentials {
    /// Create new credentials
    pub fn new(api_key: Option<String>, jwt_token: Option<String>) -> Self {
        Self { api_key, jwt_token }
    }

    /// Try to extract credentials from Authorization header
    pub fn from_authorization_header(auth_header: Option<&str>) -> Self {
        match auth_header {
            Some(header) if header.starts_with("ApiKey ") => {
                Self::new(Some(header[7..].trim().to_string()), None)
            }
            Some(header) if header.starts_with("Bearer ") => {
                Self::new(None, Some(header[7..].trim().to_string()))
            }
            _ => Self::default(),
        }
    }

    /// Whether no credential was supplied at all
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.jwt_token.is_none()
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role
    pub role: String,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token not before timestamp
    pub nbf: usize,
    /// Issued at timestamp
    pub iat: usize,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Unique token ID
    pub jti: String,
}

impl Claims {
    /// Create new claims
    pub fn new(
        sub: String,
        role: Role,
        expiry_seconds: u64,
        issuer: String,
        audience: String,
    ) -> Self {
        let iat = Utc::now().timestamp() as usize;

        Self {
            sub,
            role: role.to_string(),
            exp: iat + expiry_seconds as usize,
            nbf: iat,
            iat,
            iss: issuer,
            aud: audience,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Convert validated claims into a principal, parsing the role once
    pub fn into_principal(self) -> Result<Principal> {
        if self.sub.trim().is_empty() {
            return Err(AppError::Authentication("Token subject is empty".to_string()));
        }
        let role: Role = self.role.parse()?;
        Ok(Principal::new(self.sub, role))
    }
}

/// Authentication trait for different authentication methods
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate credentials and return the caller identity
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal>;
    /// Get the authenticator type
    fn authenticator_type(&self) -> &'static str;
}

/// API Key based authentication
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    /// Valid API keys map (key -> identity)
    valid_keys: HashMap<String, ApiKeyBinding>,
}

impl ApiKeyAuth {
    /// Create new API key authenticator
    pub fn new(valid_keys: HashMap<String, ApiKeyBinding>) -> Self {
        Self { valid_keys }
    }

    /// Whether any key is configured
    pub fn is_enabled(&self) -> bool {
        !self.valid_keys.is_empty()
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal> {
        if !self.is_enabled() {
            return Err(AppError::Authentication(
                "API key authentication is disabled".to_string(),
            ));
        }

        let api_key = credentials
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::Authentication("No API key provided".to_string()))?;

        let binding = self
            .valid_keys
            .get(api_key)
            .ok_or_else(|| AppError::Authentication("Invalid API key".to_string()))?;

        Ok(Principal::new(binding.user_id.clone(), binding.role))
    }

    fn authenticator_type(&self) -> &'static str {
        "ApiKey"
    }
}

/// JWT based authentication
#[derive(Clone)]
pub struct JwtAuth {
    /// Secret key for decoding
    decoding_key: DecodingKey,
    /// JWT issuer
    issuer: String,
    /// JWT audience
    audience: String,
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtAuth {
    /// Create new JWT authenticator
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Validate a token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.clone()]);
        validation.set_audience(&[self.audience.clone()]);
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| AppError::Authentication(format!("Invalid JWT token: {}", e)))
    }
}

#[async_trait]
impl Authenticator for JwtAuth {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal> {
        let jwt_token = credentials
            .jwt_token
            .as_ref()
            .ok_or_else(|| AppError::Authentication("No JWT token provided".to_string()))?;

        self.validate_token(jwt_token)?.into_principal()
    }

    fn authenticator_type(&self) -> &'static str {
        "JWT"
    }
}

/// Combined authenticator that tries multiple methods
#[derive(Debug, Clone)]
pub struct CombinedAuthenticator {
    /// API key authenticator
    api_key_auth: Option<ApiKeyAuth>,
    /// JWT authenticator
    jwt_auth: Option<JwtAuth>,
}

impl CombinedAuthenticator {
    /// Create new combined authenticator
    pub fn new(api_key_auth: Option<ApiKeyAuth>, jwt_auth: Option<JwtAuth>) -> Self {
        Self {
            api_key_auth,
            jwt_auth,
        }
    }

    /// Create from security settings
    pub fn from_config(config: &SecurityConfig) -> Self {
        let api_key_auth = Some(ApiKeyAuth::new(config.api_keys.clone()))
            .filter(|auth| auth.is_enabled());

        let jwt_auth = if config.jwt_secret.is_empty() {
            None
        } else {
            Some(JwtAuth::new(
                &config.jwt_secret,
                &config.jwt_issuer,
                &config.jwt_audience,
            ))
        };

        Self::new(api_key_auth, jwt_auth)
    }
}

#[async_trait]
impl Authenticator for CombinedAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal> {
        // Try API key first if available
        if let Some(api_key_auth) = &self.api_key_auth {
            if credentials.api_key.is_some() {
                return api_key_auth.authenticate(credentials).await;
            }
        }

        if let Some(jwt_auth) = &self.jwt_auth {
            if credentials.jwt_token.is_some() {
                return jwt_auth.authenticate(credentials).await;
            }
        }

        Err(AppError::Authentication(
            "No valid authentication method provided".to_string(),
        ))
    }

    fn authenticator_type(&self) -> &'static str {
        "Combined"
    }
}

/// JWT token generation helper
pub struct JwtTokenGenerator {
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    expiry_seconds: u64,
}

impl JwtTokenGenerator {
    /// Create new token generator
    pub fn new(secret: &str, issuer: &str, audience: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            expiry_seconds,
        }
    }

    /// Create a generator matching the security configuration
    pub fn from_config(config: &SecurityConfig, expiry_seconds: u64) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            expiry_seconds,
        )
    }

    /// Generate a new JWT token
    pub fn generate_token(&self, user_id: &str, role: Role) -> Result<String> {
        let claims = Claims::new(
            user_id.to_string(),
            role,
            self.expiry_seconds,
            self.issuer.clone(),
            self.audience.clone(),
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Authentication(format!("Failed to generate token: {}", e)))
    }
}
