//! Herp server: authentication and administration back office for the
//! hotel ERP.
//!
//! Main entry point that loads configuration, initialises logging, and
//! dispatches the CLI subcommand.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use herp_core::config::{AppConfig, LoggingConfig};

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

/// Load `config/default`, the environment overlay, and `HERP__` variables,
/// or a single explicit file when `--config` is given.
fn load_configuration(cli: &Cli) -> Result<AppConfig, herp_core::AppError> {
    match &cli.config {
        Some(path) => AppConfig::load_file(path),
        None => AppConfig::load(&cli.env),
    }
}

/// Initialize tracing. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
