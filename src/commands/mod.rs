//! CLI command definitions and dispatch.

pub mod create_admin;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use herp_auth::{AuthService, AuthStores, build_mailer};
use herp_cache::CacheManager;
use herp_core::config::AppConfig;
use herp_core::error::AppError;
use herp_core::traits::{Clock, SystemClock};
use herp_database::{DatabasePool, PgStore};

/// Herp: hotel ERP back-office server
#[derive(Debug, Parser)]
#[command(name = "herp-server", version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file only, skipping the layered lookup
    #[arg(short, long, env = "HERP_CONFIG")]
    pub config: Option<String>,

    /// Environment overlay loaded from `config/{env}.toml`
    #[arg(short, long, env = "HERP_ENV", default_value = "development")]
    pub env: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run migrations and start the HTTP server and background worker
    Serve(serve::ServeArgs),
    /// Apply pending database migrations and exit
    Migrate,
    /// Create an administrator with a verified email
    CreateAdmin(create_admin::CreateAdminArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(config).await,
            Commands::CreateAdmin(args) => create_admin::execute(args, config).await,
        }
    }
}

/// Connections and the auth service shared by every command.
pub struct Runtime {
    pub database: DatabasePool,
    pub stores: AuthStores,
    pub cache: Arc<CacheManager>,
    pub clock: Arc<dyn Clock>,
}

impl Runtime {
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let database = DatabasePool::connect(&config.database).await?;
        let stores = AuthStores::shared(Arc::new(PgStore::new(database.pool().clone())));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(CacheManager::with_clock(&config.cache, Arc::clone(&clock)).await?);
        Ok(Self {
            database,
            stores,
            cache,
            clock,
        })
    }

    pub fn auth_service(&self, config: &AppConfig) -> Result<AuthService, AppError> {
        AuthService::new(
            &config.auth,
            &config.rate_limit,
            self.stores.clone(),
            Arc::clone(&self.cache),
            build_mailer(&config.mail)?,
            Arc::clone(&self.clock),
        )
    }
}
