//! Per-IP sliding-window limit applied to every request.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use herp_auth::RateLimitStatus;
use herp_cache::keys;
use herp_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client_ip;
use crate::state::AppState;

const WINDOW: Duration = Duration::from_secs(60);

/// Count the request against the caller's IP and reject once the per-minute
/// budget is spent. Responses carry `X-RateLimit-*` headers either way.
pub async fn ip_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_forwarded_for,
    )
    .unwrap_or_else(|| "unknown".to_string());
    let limit = state.config.rate_limit.requests_per_minute;

    let status = match state
        .auth
        .rate_limiter()
        .hit(&keys::api_requests_ip(&ip), limit, WINDOW)
        .await
    {
        Ok(status) => status,
        Err(e) => return ApiError(e).into_response(),
    };

    if status.exceeded {
        tracing::warn!(ip = %ip, count = status.count, "Request rate limit exceeded");
        let retry_after = if status.reset_in.is_zero() {
            WINDOW
        } else {
            status.reset_in
        };
        let mut response = ApiError(AppError::rate_limited(retry_after)).into_response();
        set_headers(response.headers_mut(), &status);
        return response;
    }

    let mut response = next.run(request).await;
    set_headers(response.headers_mut(), &status);
    response
}

fn set_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(status.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(status.remaining()));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(status.reset_in.as_secs()),
    );
}
