mod audit;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geofence-cli")]
#[command(about = "Inspect and edit store delivery geofences")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report self-intersecting geofences and overlapping store pairs
    Audit,
    /// Run a candidate polygon through overlap resolution for one store
    Resolve {
        /// Store to edit
        #[arg(long)]
        store_id: i64,
        /// JSON file holding an array of `{"lat": .., "lng": ..}` vertices
        #[arg(long)]
        polygon: PathBuf,
        /// Persist the resolved polygon when it is valid
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("geofence-cli: run with --help to list commands");
        return Ok(());
    };

    let config = geofence_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "configuration loaded");

    match command {
        Commands::Audit => audit::run_audit(&config).await,
        Commands::Resolve {
            store_id,
            polygon,
            save,
        } => resolve::run_resolve(&config, store_id, &polygon, save).await,
    }
}

#[cfg(test)]
mod tests;
