//! Role and permission management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use herp_entity::role::{CreateRole, Permission, Role, UpdateRole};
use herp_service::RoleDetail;

use crate::dto::request::CreateRoleBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Role>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.roles.list_roles(&auth).await?)))
}

/// POST /api/v1/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateRoleBody>,
) -> Result<(StatusCode, Json<ApiResponse<Role>>), ApiError> {
    let role = state
        .roles
        .create_role(
            &auth,
            CreateRole {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(role))))
}

/// GET /api/v1/admin/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RoleDetail>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.roles.get_role(&auth, id).await?)))
}

/// PUT /api/v1/admin/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateRole>,
) -> Result<Json<ApiResponse<Role>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.roles.update_role(&auth, id, body).await?,
    )))
}

/// DELETE /api/v1/admin/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.roles.delete_role(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.roles.list_permissions(&auth).await?)))
}

/// GET /api/v1/admin/roles/{id}/permissions
pub async fn role_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.roles.role_permissions(&auth, id).await?,
    )))
}

/// POST /api/v1/admin/roles/{id}/permissions/{permission_id}
pub async fn add_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, permission_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state.roles.add_permission(&auth, id, permission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/roles/{id}/permissions/{permission_id}
pub async fn remove_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, permission_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state.roles.remove_permission(&auth, id, permission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
