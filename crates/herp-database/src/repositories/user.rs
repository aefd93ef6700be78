//! User repository implementation.

use sqlx::PgPool;

use herp_core::error::{AppError, ErrorKind};
use herp_core::result::AppResult;
use herp_core::types::{Page, PageRequest};
use herp_entity::principal::{CreateUser, UpdateUser, User};

use super::map_db_error;

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.first_name, \
     u.last_name, u.role_id, r.name AS role_name, u.is_active, u.created_at, u.updated_at";

/// Repository for user CRUD and lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE LOWER(u.email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by email", e))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE LOWER(u.username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
        })
    }

    /// List users ordered by id.
    pub async fn find_all(&self, page: PageRequest) -> AppResult<Page<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             ORDER BY u.id LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(Page::new(users, page, total as u64))
    }

    /// Insert a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "WITH u AS ( \
                INSERT INTO users (username, email, password_hash, first_name, last_name, role_id, is_active) \
                VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING * \
             ) SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        ))
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role_id)
        .bind(data.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to create user"))
    }

    /// Apply a partial update. Returns `None` if the user does not exist.
    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "WITH u AS ( \
                UPDATE users SET \
                    username = COALESCE($2, username), \
                    email = COALESCE($3, email), \
                    first_name = COALESCE($4, first_name), \
                    last_name = COALESCE($5, last_name), \
                    role_id = COALESCE($6, role_id), \
                    is_active = COALESCE($7, is_active), \
                    updated_at = NOW() \
                WHERE id = $1 RETURNING * \
             ) SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        ))
        .bind(id)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.role_id)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error("Failed to update user"))
    }

    /// Replace the password hash.
    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update user password", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }
}
