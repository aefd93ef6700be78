//! Refresh-token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use herp_core::error::{AppError, ErrorKind};
use herp_core::result::AppResult;
use herp_entity::principal::PrincipalRef;
use herp_entity::session::{CreateRefreshToken, RefreshToken};

use super::map_db_error;

/// Repository for persisted refresh tokens.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a token digest. A duplicate digest is a `Conflict`.
    pub async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (principal_kind, principal_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.principal.kind)
        .bind(data.principal.id)
        .bind(&data.token_hash)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to create refresh token"))
    }

    /// Find a usable token by digest.
    pub async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens \
             WHERE token_hash = $1 AND revoked = FALSE AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
        })
    }

    pub async fn revoke(&self, token_hash: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() \
             WHERE token_hash = $1 AND revoked = FALSE",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
        })?;
        Ok(())
    }

    pub async fn revoke_all(&self, principal: PrincipalRef) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() \
             WHERE principal_kind = $1 AND principal_id = $2 AND revoked = FALSE",
        )
        .bind(principal.kind)
        .bind(principal.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke refresh tokens", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Physically remove revoked or expired rows.
    pub async fn delete_expired_or_revoked(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM refresh_tokens WHERE revoked = TRUE OR expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to sweep refresh tokens",
                        e,
                    )
                })?;
        Ok(result.rows_affected())
    }
}
