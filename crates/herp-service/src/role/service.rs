//! Role CRUD and role-permission grants.
//!
//! Permission changes take effect for a principal at its next login or
//! refresh, when claims are re-derived.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use herp_core::error::AppError;
use herp_database::store::RoleStore;
use herp_entity::role::{CreateRole, Permission, Role, UpdateRole, codes};

use crate::activity::ActivityRecorder;
use crate::context::RequestContext;

/// A role together with its granted permissions.
#[derive(Debug, Clone, Serialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Manages roles and their permissions.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleStore>,
    activity: ActivityRecorder,
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService").finish()
    }
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleStore>, activity: ActivityRecorder) -> Self {
        Self { roles, activity }
    }

    pub async fn list_roles(&self, ctx: &RequestContext) -> Result<Vec<Role>, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.roles.list_roles().await
    }

    pub async fn get_role(&self, ctx: &RequestContext, role_id: i32) -> Result<RoleDetail, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        let role = self.find(role_id).await?;
        let permissions = self.roles.role_permissions(role_id).await?;
        Ok(RoleDetail { role, permissions })
    }

    pub async fn create_role(&self, ctx: &RequestContext, data: CreateRole) -> Result<Role, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Role name is required"));
        }
        let role = self
            .roles
            .create_role(CreateRole {
                name: name.to_string(),
                description: data.description,
            })
            .await?;

        self.activity
            .record(
                ctx,
                "role.create",
                "role",
                Some(role.id.to_string()),
                Some(serde_json::json!({ "name": role.name })),
            )
            .await;
        info!(actor = %ctx.principal, role_id = role.id, "Role created");
        Ok(role)
    }

    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        role_id: i32,
        data: UpdateRole,
    ) -> Result<Role, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Role name must not be empty"));
        }
        let details = serde_json::to_value(&data)?;
        let role = self
            .roles
            .update_role(role_id, data)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))?;

        self.activity
            .record(ctx, "role.update", "role", Some(role_id.to_string()), Some(details))
            .await;
        Ok(role)
    }

    /// Fails with `Conflict` while users or admins still hold the role.
    pub async fn delete_role(&self, ctx: &RequestContext, role_id: i32) -> Result<(), AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        if !self.roles.delete_role(role_id).await? {
            return Err(AppError::not_found("Role not found"));
        }
        self.activity
            .record(ctx, "role.delete", "role", Some(role_id.to_string()), None)
            .await;
        info!(actor = %ctx.principal, role_id, "Role deleted");
        Ok(())
    }

    pub async fn list_permissions(&self, ctx: &RequestContext) -> Result<Vec<Permission>, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.roles.list_permissions().await
    }

    pub async fn role_permissions(
        &self,
        ctx: &RequestContext,
        role_id: i32,
    ) -> Result<Vec<Permission>, AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.find(role_id).await?;
        self.roles.role_permissions(role_id).await
    }

    /// Grant a permission to a role. Granting twice is a no-op.
    pub async fn add_permission(
        &self,
        ctx: &RequestContext,
        role_id: i32,
        permission_id: i32,
    ) -> Result<(), AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        self.find(role_id).await?;
        let permission = self
            .roles
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| AppError::not_found("Permission not found"))?;

        self.roles.add_role_permission(role_id, permission_id).await?;
        self.activity
            .record(
                ctx,
                "role.permission.add",
                "role",
                Some(role_id.to_string()),
                Some(serde_json::json!({ "permission": permission.code })),
            )
            .await;
        Ok(())
    }

    pub async fn remove_permission(
        &self,
        ctx: &RequestContext,
        role_id: i32,
        permission_id: i32,
    ) -> Result<(), AppError> {
        ctx.require_permission(codes::ADMIN_MANAGE)?;
        if !self.roles.remove_role_permission(role_id, permission_id).await? {
            return Err(AppError::not_found("Role does not hold that permission"));
        }
        self.activity
            .record(
                ctx,
                "role.permission.remove",
                "role",
                Some(role_id.to_string()),
                Some(serde_json::json!({ "permission_id": permission_id })),
            )
            .await;
        Ok(())
    }

    async fn find(&self, role_id: i32) -> Result<Role, AppError> {
        self.roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herp_core::ErrorKind;
    use herp_database::MemoryStore;
    use herp_database::store::PrincipalStore;
    use herp_entity::principal::{CreateUser, PrincipalRef};

    fn service() -> (RoleService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::seeded());
        (
            RoleService::new(store.clone(), ActivityRecorder::new(store.clone())),
            store,
        )
    }

    fn ctx() -> RequestContext {
        RequestContext {
            principal: PrincipalRef::admin(1),
            username: "root".into(),
            role: "admin".into(),
            permissions: vec![codes::ADMIN_MANAGE.to_string()],
            ip_address: None,
            user_agent: None,
            request_time: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_role_lifecycle() {
        let (service, store) = service();
        let ctx = ctx();

        let role = service
            .create_role(
                &ctx,
                CreateRole {
                    name: " night_auditor ".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(role.name, "night_auditor");

        service.add_permission(&ctx, role.id, 2).await.unwrap();
        service.add_permission(&ctx, role.id, 2).await.unwrap();
        let detail = service.get_role(&ctx, role.id).await.unwrap();
        assert_eq!(detail.permissions.len(), 1);
        assert_eq!(detail.permissions[0].code, codes::POS_VIEW);

        service.remove_permission(&ctx, role.id, 2).await.unwrap();
        assert_eq!(
            service
                .remove_permission(&ctx, role.id, 2)
                .await
                .unwrap_err()
                .kind,
            ErrorKind::NotFound
        );

        let renamed = service
            .update_role(
                &ctx,
                role.id,
                UpdateRole {
                    name: Some("auditor".into()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "auditor");

        service.delete_role(&ctx, role.id).await.unwrap();
        assert_eq!(
            service.get_role(&ctx, role.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );

        let actions: Vec<_> = store.activity().into_iter().map(|a| a.action).collect();
        assert_eq!(
            actions,
            vec![
                "role.create",
                "role.permission.add",
                "role.permission.add",
                "role.permission.remove",
                "role.update",
                "role.delete"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_permission_and_role() {
        let (service, _) = service();
        let ctx = ctx();
        assert_eq!(
            service.add_permission(&ctx, 1, 999).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            service.add_permission(&ctx, 999, 1).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let (service, store) = service();
        store
            .create_user(CreateUser {
                username: "cashier".into(),
                email: None,
                password_hash: "x".into(),
                first_name: None,
                last_name: None,
                role_id: 2,
                is_active: true,
            })
            .await
            .unwrap();
        let err = service.delete_role(&ctx(), 2).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_duplicate_role_name_conflicts() {
        let (service, _) = service();
        let err = service
            .create_role(
                &ctx(),
                CreateRole {
                    name: "admin".into(),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_forbidden_without_admin_manage() {
        let (service, _) = service();
        let mut ctx = ctx();
        ctx.permissions.clear();
        assert_eq!(
            service.list_roles(&ctx).await.unwrap_err().kind,
            ErrorKind::Forbidden
        );
    }
}
