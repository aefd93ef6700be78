//! `create-admin`: bootstrap an administrator from the command line.

use clap::Args;

use herp_auth::RegisterAdmin;
use herp_core::config::AppConfig;
use herp_core::error::AppError;

use super::Runtime;

#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    /// Must satisfy the configured password policy
    #[arg(long, env = "HERP_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

pub async fn execute(args: &CreateAdminArgs, config: AppConfig) -> Result<(), AppError> {
    let runtime = Runtime::connect(&config).await?;
    let auth = runtime.auth_service(&config)?;

    let admin = auth
        .provision_admin(RegisterAdmin {
            username: args.username.clone(),
            email: args.email.clone(),
            password: args.password.clone(),
            first_name: args.first_name.clone(),
            last_name: args.last_name.clone(),
        })
        .await?;

    tracing::info!(admin_id = admin.id, username = %admin.username, "Administrator created");
    println!("Created admin '{}' (id {})", admin.username, admin.id);
    runtime.database.close().await;
    Ok(())
}
