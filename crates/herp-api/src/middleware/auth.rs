//! Bearer-token authentication middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::BearerToken;
use crate::state::AppState;

/// Reject requests without a valid, non-blacklisted access token.
///
/// On success the verified [`herp_auth::Claims`] are stored in the request
/// extensions for the permission guard and the `AuthUser` extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let BearerToken(token) = BearerToken::from_parts(&parts)?;
    let claims = state.auth.verify_access(&token).await?;

    parts.extensions.insert(claims);
    Ok(next.run(Request::from_parts(parts, body)).await)
}
