//! Login history handler.

use axum::Json;
use axum::extract::{Query, State};

use herp_core::types::{Page, PageRequest};
use herp_entity::audit::LoginHistory;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/admin/login-history
pub async fn login_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<ApiResponse<Page<LoginHistory>>>, ApiError> {
    let entries = state.users.login_history(&auth, page).await?;
    Ok(Json(ApiResponse::ok(entries)))
}
