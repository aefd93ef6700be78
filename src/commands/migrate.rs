//! `migrate`: apply pending migrations.

use herp_core::config::AppConfig;
use herp_core::error::AppError;
use herp_database::DatabasePool;
use herp_database::migration::run_migrations;

pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    let database = DatabasePool::connect(&config.database).await?;
    run_migrations(database.pool()).await?;
    database.close().await;
    Ok(())
}
