//! Permission guards for route groups.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use herp_auth::Claims;
use herp_core::error::AppError;
use herp_entity::role::codes;

use crate::error::ApiError;
use crate::state::AppState;

/// Check that the authenticated caller holds `code`.
pub fn check_permission(state: &AppState, claims: Option<&Claims>, code: &str) -> Result<(), AppError> {
    let claims = claims.ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    state.auth.require_permission(claims, code)
}

/// Guard for the administration routes. Must run after `require_auth`.
pub async fn require_admin_manage(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check_permission(&state, request.extensions().get::<Claims>(), codes::ADMIN_MANAGE)?;
    Ok(next.run(request).await)
}
