//! User CRUD, password changes, and session revocation for administrators.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use herp_auth::AuthService;
use herp_cache::{CacheManager, keys};
use herp_core::error::{AppError, best_effort};
use herp_core::traits::CacheProvider;
use herp_core::types::{Page, PageRequest};
use herp_database::store::{PrincipalStore, RoleStore};
use herp_entity::audit::{ActivityLog, LoginHistory};
use herp_entity::principal::{CreateUser, PrincipalRef, UpdateUser, User};
use herp_entity::role::codes;

use crate::activity::ActivityRecorder;
use crate::context::RequestContext;

/// How long a fetched user stays cached.
const USER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Request to create a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    /// Initial password, hashed before storage.
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role_id: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Handles administrative user management operations.
#[derive(Clone)]
pub struct UserAdminService {
    principals: Arc<dyn PrincipalStore>,
    roles: Arc<dyn RoleStore>,
    auth: Arc<AuthService>,
    cache: Arc<CacheManager>,
    activity: ActivityRecorder,
}

impl std::fmt::Debug for UserAdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAdminService").finish()
    }
}

impl UserAdminService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        roles: Arc<dyn RoleStore>,
        auth: Arc<AuthService>,
        cache: Arc<CacheManager>,
        activity: ActivityRecorder,
    ) -> Self {
        Self {
            principals,
            roles,
            auth,
            cache,
            activity,
        }
    }

    /// Lists users with pagination.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<Page<User>, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.principals.list_users(page.normalized()).await
    }

    /// Gets a single user, served from the cache when possible.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: i32) -> Result<User, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        let key = keys::user_by_id(user_id);

        match self.cache.get_json::<User>(&key).await {
            Ok(Some(user)) => {
                debug!(user_id, "User served from cache");
                return Ok(user);
            }
            Ok(None) => {}
            Err(e) => debug!(user_id, error = %e, "User cache read failed"),
        }

        let user = self
            .principals
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        best_effort(
            "cache_user",
            self.cache.set_json(&key, &user, USER_CACHE_TTL),
        )
        .await;
        Ok(user)
    }

    /// Creates a new user.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        req: CreateUserRequest,
    ) -> Result<User, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;

        let username = req.username.trim();
        if username.chars().count() < 3 {
            return Err(AppError::validation(
                "Username must be at least 3 characters",
            ));
        }
        self.ensure_role(req.role_id).await?;
        self.auth.validator().validate(&req.password)?;
        let password_hash = self.auth.hash_password(&req.password).await?;

        let user = self
            .principals
            .create_user(CreateUser {
                username: username.to_string(),
                email: req.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                role_id: req.role_id,
                is_active: req.is_active,
            })
            .await?;

        self.activity
            .record(
                ctx,
                "user.create",
                "user",
                Some(user.id.to_string()),
                Some(serde_json::json!({ "username": user.username, "role_id": user.role_id })),
            )
            .await;

        info!(
            actor = %ctx.principal,
            new_user_id = user.id,
            username = %user.username,
            "User created by admin"
        );
        Ok(user)
    }

    /// Partially updates a user. Deactivating a user also ends its sessions.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        req: UpdateUser,
    ) -> Result<User, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        if req.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        if let Some(role_id) = req.role_id {
            self.ensure_role(role_id).await?;
        }

        let deactivated = req.is_active == Some(false);
        let details = serde_json::to_value(&req)?;
        let user = self
            .principals
            .update_user(user_id, req)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        self.invalidate(user_id).await;
        if deactivated {
            self.auth
                .revoke_all_sessions(PrincipalRef::user(user_id))
                .await?;
        }

        self.activity
            .record(ctx, "user.update", "user", Some(user_id.to_string()), Some(details))
            .await;
        info!(actor = %ctx.principal, user_id, "User updated by admin");
        Ok(user)
    }

    /// Deletes a user and revokes its sessions.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: i32) -> Result<(), AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        if !self.principals.delete_user(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }

        self.invalidate(user_id).await;
        self.auth
            .revoke_all_sessions(PrincipalRef::user(user_id))
            .await?;
        self.activity
            .record(ctx, "user.delete", "user", Some(user_id.to_string()), None)
            .await;
        info!(actor = %ctx.principal, user_id, "User deleted by admin");
        Ok(())
    }

    /// Replaces a user's password and ends all of its sessions.
    pub async fn set_password(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        new_password: &str,
    ) -> Result<(), AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.auth.validator().validate(new_password)?;
        let hash = self.auth.hash_password(new_password).await?;

        if !self.principals.update_user_password(user_id, &hash).await? {
            return Err(AppError::not_found("User not found"));
        }
        let revoked = self
            .auth
            .revoke_all_sessions(PrincipalRef::user(user_id))
            .await?;

        self.activity
            .record(ctx, "user.password.set", "user", Some(user_id.to_string()), None)
            .await;
        info!(actor = %ctx.principal, user_id, revoked, "User password set by admin");
        Ok(())
    }

    /// Ends every session of a user. Returns how many were live.
    pub async fn revoke_sessions(&self, ctx: &RequestContext, user_id: i32) -> Result<u64, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        if self.principals.find_user_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }
        let revoked = self
            .auth
            .revoke_all_sessions(PrincipalRef::user(user_id))
            .await?;
        self.activity
            .record(
                ctx,
                "user.sessions.revoke",
                "user",
                Some(user_id.to_string()),
                Some(serde_json::json!({ "revoked": revoked })),
            )
            .await;
        Ok(revoked)
    }

    /// Activity performed by a user.
    pub async fn user_activity(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Page<ActivityLog>, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.activity
            .list_for(PrincipalRef::user(user_id), page.normalized())
            .await
    }

    /// All recorded login attempts.
    pub async fn login_history(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<Page<LoginHistory>, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.activity.login_history(page.normalized()).await
    }

    async fn ensure_role(&self, role_id: i32) -> Result<(), AppError> {
        match self.roles.find_role(role_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::validation(format!("Role {role_id} does not exist"))),
        }
    }

    async fn invalidate(&self, user_id: i32) {
        best_effort(
            "invalidate_cached_user",
            self.cache.delete(&keys::user_by_id(user_id)),
        )
        .await;
    }
}
