//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use herp_core::traits::CacheProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// 200 when every configured backend answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.database {
        Some(pool) => check_backend(pool.health_check().await, "database"),
        None => "not_configured",
    };
    let cache = check_backend(state.cache.health_check().await, "cache");

    let healthy = database != "down" && cache != "down";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            cache: cache.to_string(),
        }),
    )
}

fn check_backend(result: Result<bool, herp_core::AppError>, backend: &str) -> &'static str {
    match result {
        Ok(true) => "up",
        Ok(false) => "down",
        Err(e) => {
            tracing::warn!(backend, error = %e, "Health check failed");
            "down"
        }
    }
}
