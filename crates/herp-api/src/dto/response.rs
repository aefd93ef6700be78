//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herp_auth::{Claims, LoginResult};
use herp_entity::principal::{Principal, PrincipalKind};
use herp_entity::session::TokenPair;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The authenticated user or admin.
    pub principal: Principal,
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            tokens: result.tokens,
            principal: result.principal,
        }
    }
}

/// The caller's identity as carried by the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: i32,
    pub principal_kind: PrincipalKind,
    pub username: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Claims> for MeResponse {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            principal_kind: claims.principal_kind,
            username: claims.username.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            permissions: claims.permissions.clone(),
            expires_at: claims.expires_at(),
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Number of refresh tokens revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedResponse {
    pub revoked: u64,
}

/// Health check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    pub version: String,
    /// `"up"`, `"down"`, or `"not_configured"`.
    pub database: String,
    pub cache: String,
}
