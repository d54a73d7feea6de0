//! Bikeshop CLI - Database migrations and catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! bikeshop-cli migrate
//!
//! # Seed the catalog from a YAML file
//! bikeshop-cli seed catalog.yaml
//!
//! # Seed, writing images somewhere other than the configured static dir
//! bikeshop-cli seed catalog.yaml --images-dir /srv/bikeshop/static/images
//!
//! # Print catalog and cart statistics
//! bikeshop-cli stats
//! ```
//!
//! Connection settings come from the same environment variables as the
//! server (`BIKESHOP_DATABASE_URL`, `BIKESHOP_STATIC_DIR`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bikeshop_server::config::ServerConfig;

mod commands;

#[derive(Parser)]
#[command(name = "bikeshop-cli")]
#[command(author, version, about = "Bikeshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert products listed in a YAML file
    Seed {
        /// Path to the YAML catalog
        file: PathBuf,

        /// Directory to copy images into (defaults to `<static_dir>/images`)
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },
    /// Show product and cart counts
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&config).await?,
        Commands::Seed { file, images_dir } => {
            let images_dir = images_dir.unwrap_or_else(|| config.image_dir());
            commands::seed::run(&config, &file, images_dir).await?;
        }
        Commands::Stats => commands::stats::run(&config).await?,
    }
    Ok(())
}
