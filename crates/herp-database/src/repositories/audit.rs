//! Login history and activity log repository.

use sqlx::PgPool;

use herp_core::error::{AppError, ErrorKind};
use herp_core::result::AppResult;
use herp_core::types::{Page, PageRequest};
use herp_entity::audit::{ActivityLog, CreateActivityLog, CreateLoginHistory, LoginHistory};
use herp_entity::principal::PrincipalRef;

/// Append-only audit tables.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_login(&self, entry: &CreateLoginHistory) -> AppResult<()> {
        let reason = (!entry.outcome.is_success()).then(|| entry.outcome.as_str());
        sqlx::query(
            "INSERT INTO login_history \
             (principal_kind, principal_id, identifier, ip_address, user_agent, success, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.principal_kind)
        .bind(entry.principal_id)
        .bind(&entry.identifier)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.outcome.is_success())
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to log login", e))?;
        Ok(())
    }

    pub async fn insert_activity(&self, entry: &CreateActivityLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO activity_logs \
             (actor_kind, actor_id, action, target_type, target_id, details, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.actor_kind)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.target_type)
        .bind(&entry.target_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to log activity", e))?;
        Ok(())
    }

    /// Most recent login attempts first.
    pub async fn find_login_history(&self, page: PageRequest) -> AppResult<Page<LoginHistory>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM login_history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count login history", e)
            })?;

        let rows = sqlx::query_as::<_, LoginHistory>(
            "SELECT * FROM login_history ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list login history", e)
        })?;

        Ok(Page::new(rows, page, total as u64))
    }

    /// Most recent actions of one actor first.
    pub async fn find_activity(
        &self,
        actor: PrincipalRef,
        page: PageRequest,
    ) -> AppResult<Page<ActivityLog>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_logs WHERE actor_kind = $1 AND actor_id = $2",
        )
        .bind(actor.kind)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count activity", e))?;

        let rows = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs WHERE actor_kind = $1 AND actor_id = $2 \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
        )
        .bind(actor.kind)
        .bind(actor.id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activity", e))?;

        Ok(Page::new(rows, page, total as u64))
    }
}
