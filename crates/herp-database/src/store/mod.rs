//! Persistence seams used by the auth core and admin services.
//!
//! Every method that compares against the current time takes `now`
//! explicitly so the caller's clock decides expiry, not the database's.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use herp_core::result::AppResult;
use herp_core::types::{Page, PageRequest};
use herp_entity::audit::{ActivityLog, CreateActivityLog, CreateLoginHistory, LoginHistory};
use herp_entity::principal::{Admin, CreateAdmin, CreateUser, PrincipalRef, UpdateUser, User};
use herp_entity::role::{CreateRole, Permission, Role, UpdateRole};
use herp_entity::session::{CreateRefreshToken, RefreshToken};

/// Users and administrators.
#[async_trait]
pub trait PrincipalStore: Send + Sync + 'static {
    async fn find_user_by_id(&self, id: i32) -> AppResult<Option<User>>;
    /// Case-insensitive email match.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Case-insensitive username match.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_users(&self, page: PageRequest) -> AppResult<Page<User>>;
    /// Fails with `Conflict` on a duplicate username or email.
    async fn create_user(&self, data: CreateUser) -> AppResult<User>;
    /// Returns `None` if the user does not exist.
    async fn update_user(&self, id: i32, data: UpdateUser) -> AppResult<Option<User>>;
    async fn update_user_password(&self, id: i32, password_hash: &str) -> AppResult<bool>;
    async fn delete_user(&self, id: i32) -> AppResult<bool>;

    async fn find_admin_by_id(&self, id: i32) -> AppResult<Option<Admin>>;
    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>>;
    async fn find_admin_by_username(&self, username: &str) -> AppResult<Option<Admin>>;
    /// Fails with `Conflict` on a duplicate username or email.
    async fn create_admin(&self, data: CreateAdmin) -> AppResult<Admin>;
    async fn set_verification_code(
        &self,
        admin_id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
    /// Mark the email verified and clear the code in one update, only if
    /// `code` matches and has not expired at `now`. Returns whether it applied.
    async fn confirm_email(&self, admin_id: i32, code: &str, now: DateTime<Utc>)
    -> AppResult<bool>;
    /// Mark the email verified without a code. Returns whether the admin exists.
    async fn mark_email_verified(&self, admin_id: i32, now: DateTime<Utc>) -> AppResult<bool>;
    async fn set_reset_code(
        &self,
        admin_id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
    /// Replace the password and clear the reset code in one update, only if
    /// `code` matches and has not expired at `now`. Returns whether it applied.
    async fn reset_admin_password(
        &self,
        admin_id: i32,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Roles, permissions, and their join table.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    async fn list_roles(&self) -> AppResult<Vec<Role>>;
    async fn find_role(&self, id: i32) -> AppResult<Option<Role>>;
    /// Fails with `Conflict` on a duplicate name.
    async fn create_role(&self, data: CreateRole) -> AppResult<Role>;
    async fn update_role(&self, id: i32, data: UpdateRole) -> AppResult<Option<Role>>;
    /// Fails with `Conflict` while principals still reference the role.
    async fn delete_role(&self, id: i32) -> AppResult<bool>;
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;
    async fn find_permission(&self, id: i32) -> AppResult<Option<Permission>>;
    async fn role_permissions(&self, role_id: i32) -> AppResult<Vec<Permission>>;
    /// Distinct permission codes granted to the role, sorted.
    async fn permission_codes(&self, role_id: i32) -> AppResult<Vec<String>>;
    /// Idempotent: adding an existing grant is a no-op.
    async fn add_role_permission(&self, role_id: i32, permission_id: i32) -> AppResult<()>;
    async fn remove_role_permission(&self, role_id: i32, permission_id: i32) -> AppResult<bool>;
}

/// Persisted refresh tokens, keyed by the digest of the opaque token.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Fails with `Conflict` if the digest already exists.
    async fn create_refresh_token(&self, data: CreateRefreshToken) -> AppResult<RefreshToken>;
    /// Returns the row only if it is not revoked and not expired at `now`.
    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>>;
    /// Idempotent.
    async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<()>;
    /// Returns the number of rows newly revoked.
    async fn revoke_all_refresh_tokens(&self, principal: PrincipalRef) -> AppResult<u64>;
    /// Physically delete rows that are revoked or expired at `now`.
    async fn delete_expired_or_revoked(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Login history and activity log.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    async fn record_login(&self, entry: CreateLoginHistory) -> AppResult<()>;
    async fn record_activity(&self, entry: CreateActivityLog) -> AppResult<()>;
    async fn list_login_history(&self, page: PageRequest) -> AppResult<Page<LoginHistory>>;
    async fn list_activity(
        &self,
        actor: PrincipalRef,
        page: PageRequest,
    ) -> AppResult<Page<ActivityLog>>;
}
