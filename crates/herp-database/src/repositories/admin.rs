//! Administrator repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use herp_core::error::{AppError, ErrorKind};
use herp_core::result::AppResult;
use herp_entity::principal::{Admin, CreateAdmin};

use super::map_db_error;

const ADMIN_COLUMNS: &str = "a.id, a.username, a.email, a.password_hash, a.first_name, \
     a.last_name, a.role_id, r.name AS role_name, a.is_active, a.email_verified, \
     a.verification_code, a.verification_expires_at, a.reset_code, a.reset_code_expires_at, \
     a.created_at, a.updated_at";

/// Repository for administrator accounts and their one-time codes.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins a JOIN roles r ON r.id = a.role_id WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find admin by id", e))
    }

    /// Find an admin by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins a JOIN roles r ON r.id = a.role_id \
             WHERE LOWER(a.email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find admin by email", e)
        })
    }

    /// Find an admin by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins a JOIN roles r ON r.id = a.role_id \
             WHERE LOWER(a.username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find admin by username", e)
        })
    }

    /// Insert a new, active, unverified admin.
    pub async fn create(&self, data: &CreateAdmin) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>(&format!(
            "WITH a AS ( \
                INSERT INTO admins (username, email, password_hash, first_name, last_name, role_id) \
                VALUES ($1, $2, $3, $4, $5, $6) RETURNING * \
             ) SELECT {ADMIN_COLUMNS} FROM a JOIN roles r ON r.id = a.role_id"
        ))
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to create admin"))
    }

    /// Store a pending email verification code.
    pub async fn set_verification_code(
        &self,
        id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE admins SET verification_code = $2, verification_expires_at = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set verification code", e)
        })?;
        Ok(())
    }

    /// Mark verified and clear the code, if the code matches and is live.
    pub async fn confirm_email(&self, id: i32, code: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE admins SET email_verified = TRUE, verification_code = NULL, \
             verification_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND email_verified = FALSE AND verification_code = $2 \
             AND verification_expires_at > $3",
        )
        .bind(id)
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to verify email", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Set `email_verified` directly, for accounts provisioned by an operator.
    pub async fn mark_email_verified(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE admins SET email_verified = TRUE, verification_code = NULL, \
             verification_expires_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to verify email", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Store a pending password reset code.
    pub async fn set_reset_code(
        &self,
        id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE admins SET reset_code = $2, reset_code_expires_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set reset code", e))?;
        Ok(())
    }

    /// Replace the password and clear the reset code, if the code matches and is live.
    pub async fn reset_password(
        &self,
        id: i32,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE admins SET password_hash = $3, reset_code = NULL, \
             reset_code_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND reset_code = $2 AND reset_code_expires_at > $4",
        )
        .bind(id)
        .bind(code)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset password", e))?;
        Ok(result.rows_affected() == 1)
    }
}
