//! Store-trait implementations over the PostgreSQL repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use herp_core::result::AppResult;
use herp_core::types::{Page, PageRequest};
use herp_entity::audit::{ActivityLog, CreateActivityLog, CreateLoginHistory, LoginHistory};
use herp_entity::principal::{Admin, CreateAdmin, CreateUser, PrincipalRef, UpdateUser, User};
use herp_entity::role::{CreateRole, Permission, Role, UpdateRole};
use herp_entity::session::{CreateRefreshToken, RefreshToken};

use super::{
    AdminRepository, AuditRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};
use crate::store::{AuditStore, PrincipalStore, RefreshTokenStore, RoleStore};

/// All repositories over one pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pub users: UserRepository,
    pub admins: AdminRepository,
    pub roles: RoleRepository,
    pub refresh_tokens: RefreshTokenRepository,
    pub audit: AuditRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            admins: AdminRepository::new(pool.clone()),
            roles: RoleRepository::new(pool.clone()),
            refresh_tokens: RefreshTokenRepository::new(pool.clone()),
            audit: AuditRepository::new(pool),
        }
    }
}

#[async_trait]
impl PrincipalStore for PgStore {
    async fn find_user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn list_users(&self, page: PageRequest) -> AppResult<Page<User>> {
        self.users.find_all(page).await
    }

    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        self.users.create(&data).await
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> AppResult<Option<User>> {
        self.users.update(id, &data).await
    }

    async fn update_user_password(&self, id: i32, password_hash: &str) -> AppResult<bool> {
        self.users.update_password(id, password_hash).await
    }

    async fn delete_user(&self, id: i32) -> AppResult<bool> {
        self.users.delete(id).await
    }

    async fn find_admin_by_id(&self, id: i32) -> AppResult<Option<Admin>> {
        self.admins.find_by_id(id).await
    }

    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        self.admins.find_by_email(email).await
    }

    async fn find_admin_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        self.admins.find_by_username(username).await
    }

    async fn create_admin(&self, data: CreateAdmin) -> AppResult<Admin> {
        self.admins.create(&data).await
    }

    async fn set_verification_code(
        &self,
        admin_id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.admins
            .set_verification_code(admin_id, code, expires_at)
            .await
    }

    async fn confirm_email(
        &self,
        admin_id: i32,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.admins.confirm_email(admin_id, code, now).await
    }

    async fn mark_email_verified(&self, admin_id: i32, _now: DateTime<Utc>) -> AppResult<bool> {
        self.admins.mark_email_verified(admin_id).await
    }

    async fn set_reset_code(
        &self,
        admin_id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.admins.set_reset_code(admin_id, code, expires_at).await
    }

    async fn reset_admin_password(
        &self,
        admin_id: i32,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.admins
            .reset_password(admin_id, code, password_hash, now)
            .await
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.find_all().await
    }

    async fn find_role(&self, id: i32) -> AppResult<Option<Role>> {
        self.roles.find_by_id(id).await
    }

    async fn create_role(&self, data: CreateRole) -> AppResult<Role> {
        self.roles.create(&data).await
    }

    async fn update_role(&self, id: i32, data: UpdateRole) -> AppResult<Option<Role>> {
        self.roles.update(id, &data).await
    }

    async fn delete_role(&self, id: i32) -> AppResult<bool> {
        self.roles.delete(id).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.roles.find_all_permissions().await
    }

    async fn find_permission(&self, id: i32) -> AppResult<Option<Permission>> {
        self.roles.find_permission(id).await
    }

    async fn role_permissions(&self, role_id: i32) -> AppResult<Vec<Permission>> {
        self.roles.role_permissions(role_id).await
    }

    async fn permission_codes(&self, role_id: i32) -> AppResult<Vec<String>> {
        self.roles.permission_codes(role_id).await
    }

    async fn add_role_permission(&self, role_id: i32, permission_id: i32) -> AppResult<()> {
        self.roles.add_permission(role_id, permission_id).await
    }

    async fn remove_role_permission(&self, role_id: i32, permission_id: i32) -> AppResult<bool> {
        self.roles.remove_permission(role_id, permission_id).await
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create_refresh_token(&self, data: CreateRefreshToken) -> AppResult<RefreshToken> {
        self.refresh_tokens.create(&data).await
    }

    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>> {
        self.refresh_tokens.find_active(token_hash, now).await
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<()> {
        self.refresh_tokens.revoke(token_hash).await
    }

    async fn revoke_all_refresh_tokens(&self, principal: PrincipalRef) -> AppResult<u64> {
        self.refresh_tokens.revoke_all(principal).await
    }

    async fn delete_expired_or_revoked(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.refresh_tokens.delete_expired_or_revoked(now).await
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn record_login(&self, entry: CreateLoginHistory) -> AppResult<()> {
        self.audit.insert_login(&entry).await
    }

    async fn record_activity(&self, entry: CreateActivityLog) -> AppResult<()> {
        self.audit.insert_activity(&entry).await
    }

    async fn list_login_history(&self, page: PageRequest) -> AppResult<Page<LoginHistory>> {
        self.audit.find_login_history(page).await
    }

    async fn list_activity(
        &self,
        actor: PrincipalRef,
        page: PageRequest,
    ) -> AppResult<Page<ActivityLog>> {
        self.audit.find_activity(actor, page).await
    }
}
