//! Database migration command.
//!
//! Applies the migrations embedded in `bikeshop-server` (the same set the
//! server runs at startup). Already-applied migrations are skipped.
//!
//! # Environment Variables
//!
//! - `BIKESHOP_DATABASE_URL` - `SQLite` connection string (created if missing)

use thiserror::Error;

use bikeshop_server::config::ServerConfig;
use bikeshop_server::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Could not open the database.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run(config: &ServerConfig) -> Result<(), MigrationError> {
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;

    tracing::info!(
        available = db::MIGRATOR.iter().count(),
        "Running migrations..."
    );
    db::migrate(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete!");
    Ok(())
}
