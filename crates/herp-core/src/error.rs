//! Unified application error types for Herp.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The HTTP layer maps [`ErrorKind`]
//! onto status codes; nothing below it knows about HTTP.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Unknown identifier or wrong password. Deliberately indistinguishable.
    InvalidCredentials,
    /// The principal exists but the account is disabled.
    UserInactive,
    /// Too many attempts; retry later.
    RateLimited,
    /// Malformed, expired, or badly signed access token.
    TokenInvalid,
    /// Well-formed token that was explicitly logged out.
    TokenBlacklisted,
    /// Missing or malformed Authorization header.
    Unauthorized,
    /// Valid identity, missing permission.
    Forbidden,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A uniqueness constraint was violated.
    Conflict,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An external service (mail provider) failed.
    ExternalService,
    /// An internal server error occurred.
    Internal,
}

impl ErrorKind {
    /// Returns whether this kind is a server-side failure that must not be
    /// described to the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database
                | Self::Cache
                | Self::Configuration
                | Self::Serialization
                | Self::ExternalService
                | Self::Internal
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::UserInactive => write!(f, "USER_INACTIVE"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::TokenInvalid => write!(f, "TOKEN_INVALID"),
            Self::TokenBlacklisted => write!(f, "TOKEN_BLACKLISTED"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Herp.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// How long the caller should wait before retrying (rate limiting only).
    pub retry_after: Option<Duration>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create the generic credential failure. The message never says which
    /// check failed.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid credentials")
    }

    /// Create an inactive-account error.
    pub fn user_inactive() -> Self {
        Self::new(ErrorKind::UserInactive, "User is inactive")
    }

    /// Create a rate-limit error carrying the retry delay.
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self {
            kind: ErrorKind::RateLimited,
            message: "Too many attempts, try again later".to_string(),
            retry_after: Some(retry_after),
            source: None,
        }
    }

    /// Create an invalid-token error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create a blacklisted-token error.
    pub fn token_blacklisted() -> Self {
        Self::new(ErrorKind::TokenBlacklisted, "Token has been revoked")
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external-service error.
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns whether this error is a server-side failure.
    pub fn is_internal(&self) -> bool {
        self.kind.is_internal()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            retry_after: self.retry_after,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

/// Runs a side effect whose failure must not fail the surrounding operation.
///
/// The error is logged at `warn` with the operation name so operators keep
/// visibility into dropped writes.
pub async fn best_effort<F>(operation: &'static str, fut: F)
where
    F: Future<Output = Result<(), AppError>>,
{
    if let Err(e) = fut.await {
        tracing::warn!(operation, error = %e, "Best-effort operation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_kinds() {
        assert!(ErrorKind::Database.is_internal());
        assert!(ErrorKind::Cache.is_internal());
        assert!(!ErrorKind::InvalidCredentials.is_internal());
        assert!(!ErrorKind::RateLimited.is_internal());
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let err = AppError::rate_limited(Duration::from_secs(90));
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(Duration::from_secs(90)));
        assert_eq!(err.clone().retry_after, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_display() {
        let err = AppError::invalid_credentials();
        assert_eq!(err.to_string(), "INVALID_CREDENTIALS: Invalid credentials");
    }

    #[tokio::test]
    async fn test_best_effort_swallows_error() {
        best_effort("noop", async { Err(AppError::internal("boom")) }).await;
        best_effort("noop", async { Ok(()) }).await;
    }
}
