//! Route definitions for the Herp HTTP API.
//!
//! API routes are mounted under `/api/v1`; `/health` sits at the root.
//! Every request passes the per-IP rate limit and the request logger.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::handlers::admin;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let server = state.config.server.clone();

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(session_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::ip_rate_limit,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::logging::request_logging,
        ))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(build_cors_layer(&server.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Public auth endpoints. Logout verifies the presented token itself so an
/// expired access token can still be logged out.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/verify-email", post(handlers::auth::verify_email))
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/logout-all", post(handlers::auth::logout_all))
}

/// Endpoints that need a live access token.
fn session_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(from_fn_with_state(state, middleware::auth::require_auth))
}

/// User, role, and audit administration behind `admin:manage`.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(admin::users::list_users).post(admin::users::create_user),
        )
        .route(
            "/users/{id}",
            get(admin::users::get_user)
                .put(admin::users::update_user)
                .delete(admin::users::delete_user),
        )
        .route(
            "/users/{id}/password",
            put(admin::users::set_password),
        )
        .route("/users/{id}/activity", get(admin::users::user_activity))
        .route("/users/{id}/sessions", delete(admin::users::revoke_sessions))
        .route("/login-history", get(admin::audit::login_history))
        .route(
            "/roles",
            get(admin::roles::list_roles).post(admin::roles::create_role),
        )
        .route(
            "/roles/{id}",
            get(admin::roles::get_role)
                .put(admin::roles::update_role)
                .delete(admin::roles::delete_role),
        )
        .route("/roles/{id}/permissions", get(admin::roles::role_permissions))
        .route(
            "/roles/{id}/permissions/{permission_id}",
            post(admin::roles::add_permission).delete(admin::roles::remove_permission),
        )
        .route("/permissions", get(admin::roles::list_permissions))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::permission::require_admin_manage,
        ))
        .route_layer(from_fn_with_state(state, middleware::auth::require_auth))
}
