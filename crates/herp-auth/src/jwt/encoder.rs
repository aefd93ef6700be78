//! Access-token signing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use herp_core::config::AuthConfig;
use herp_core::error::{AppError, ErrorKind};
use herp_core::traits::Clock;
use herp_entity::principal::Principal;

use super::claims::{Claims, TokenType};

/// Signs access tokens with HMAC-SHA256.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedAccessToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: config.access_ttl(),
            clock,
        }
    }

    /// Configured access-token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue an access token with the configured lifetime.
    pub fn issue_access(
        &self,
        principal: &Principal,
        permissions: Vec<String>,
    ) -> Result<IssuedAccessToken, AppError> {
        self.issue(principal, permissions, TokenType::Access, self.access_ttl)
    }

    /// Issue a token of the given type and lifetime.
    pub fn issue(
        &self,
        principal: &Principal,
        permissions: Vec<String>,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedAccessToken, AppError> {
        let now = self.clock.now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Token TTL too large", e))?;

        let claims = Claims {
            user_id: principal.id(),
            username: principal.username().to_string(),
            email: principal.email().to_string(),
            role: principal.role_name().to_string(),
            permissions,
            token_type,
            principal_kind: principal.kind(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let token = self.encode(&claims)?;
        Ok(IssuedAccessToken { token, claims })
    }

    /// Sign arbitrary claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to sign access token", e)
        })
    }
}
