//! Admin user management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use herp_core::types::{Page, PageRequest};
use herp_entity::audit::ActivityLog;
use herp_entity::principal::{UpdateUser, User};

use crate::dto::request::{CreateUserBody, SetPasswordBody};
use crate::dto::response::{ApiResponse, MessageResponse, RevokedResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<ApiResponse<Page<User>>>, ApiError> {
    let users = state.users.list_users(&auth, page).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateUserBody>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.users.create_user(&auth, body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.get_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.update_user(&auth, id, body).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.users.delete_user(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/users/{id}/password
pub async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<SetPasswordBody>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.users.set_password(&auth, id, &body.new_password).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Password updated"))))
}

/// GET /api/v1/admin/users/{id}/activity
pub async fn user_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(page): Query<PageRequest>,
) -> Result<Json<ApiResponse<Page<ActivityLog>>>, ApiError> {
    let entries = state.users.user_activity(&auth, id, page).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// DELETE /api/v1/admin/users/{id}/sessions
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RevokedResponse>>, ApiError> {
    let revoked = state.users.revoke_sessions(&auth, id).await?;
    Ok(Json(ApiResponse::ok(RevokedResponse { revoked })))
}
