use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod check;
mod stores;

#[derive(Debug, Parser)]
#[command(name = "stockcheck")]
#[command(about = "Check which stores carry a list of ingredients")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve ingredient availability across every enabled store.
    Check {
        /// Stores file; defaults to STOCKCHECK_STORES_PATH.
        #[arg(long)]
        stores: Option<PathBuf>,
        /// Global match threshold (0-100). Per-store overrides still apply.
        #[arg(long, value_parser = stockcheck_core::parse_threshold)]
        threshold: Option<f64>,
        /// Print the full report as JSON instead of a table.
        #[arg(long)]
        json: bool,
        #[arg(required = true)]
        ingredients: Vec<String>,
    },
    /// List configured stores.
    Stores {
        #[arg(long)]
        stores: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = stockcheck_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            stores,
            threshold,
            json,
            ingredients,
        } => {
            let path = stores.unwrap_or_else(|| config.stores_path.clone());
            check::run_check(&config, &path, threshold, json, &ingredients).await
        }
        Commands::Stores { stores } => {
            let path = stores.unwrap_or_else(|| config.stores_path.clone());
            stores::run_stores(&config, &path)
        }
    }
}

#[cfg(test)]
mod tests;
