//! Request/response logging middleware.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::extractors::client_ip;
use crate::state::AppState;

/// Logs request method, path, status, duration, and client IP.
pub async fn request_logging(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_forwarded_for,
    );
    let start = Instant::now();

    let response = next.run(request).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms,
        ip = ip.as_deref().unwrap_or("unknown"),
        "HTTP request"
    );

    response
}
