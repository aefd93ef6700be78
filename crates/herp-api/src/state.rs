//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use herp_auth::{AuthService, AuthStores, Mailer};
use herp_cache::CacheManager;
use herp_core::config::AppConfig;
use herp_core::error::AppError;
use herp_core::traits::Clock;
use herp_database::DatabasePool;
use herp_service::{ActivityRecorder, RoleService, UserAdminService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,
    /// PostgreSQL pool, absent when running over in-memory stores
    pub database: Option<DatabasePool>,
    /// Login, refresh, logout, and token verification
    pub auth: Arc<AuthService>,
    /// Administrative user management
    pub users: Arc<UserAdminService>,
    /// Role and permission management
    pub roles: Arc<RoleService>,
}

impl AppState {
    /// Wire every service from its stores.
    pub fn new(
        config: AppConfig,
        stores: AuthStores,
        cache: Arc<CacheManager>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        database: Option<DatabasePool>,
    ) -> Result<Self, AppError> {
        let auth = Arc::new(AuthService::new(
            &config.auth,
            &config.rate_limit,
            stores.clone(),
            Arc::clone(&cache),
            mailer,
            clock,
        )?);

        let activity = ActivityRecorder::new(Arc::clone(&stores.audit));
        let users = Arc::new(UserAdminService::new(
            Arc::clone(&stores.principals),
            Arc::clone(&stores.roles),
            Arc::clone(&auth),
            Arc::clone(&cache),
            activity.clone(),
        ));
        let roles = Arc::new(RoleService::new(Arc::clone(&stores.roles), activity));

        Ok(Self {
            config: Arc::new(config),
            cache,
            database,
            auth,
            users,
            roles,
        })
    }
}
