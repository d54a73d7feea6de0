//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `BIKESHOP_DATABASE_URL` - SQLite connection string (falls back to `DATABASE_URL`,
//!   default: `sqlite://bikeshop.db`)
//! - `BIKESHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `BIKESHOP_PORT` - Listen port (default: 8000)
//! - `BIKESHOP_STATIC_DIR` - Static file root, images live in `images/` below it
//!   (default: `static`)
//! - `BIKESHOP_MAX_UPLOAD_BYTES` - Maximum request body size for uploads (default: 10 MiB)
//! - `BIKESHOP_DB_MAX_CONNECTIONS` - SQLite pool size (default: 5)
//! - `BIKESHOP_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://bikeshop.db";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("BIKESHOP_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let host = parse_or_default::<IpAddr, _>(&lookup, "BIKESHOP_HOST", "127.0.0.1".parse())?;
        let port = parse_or_default(&lookup, "BIKESHOP_PORT", Ok(8000u16))?;
        let static_dir = lookup("BIKESHOP_STATIC_DIR")
            .map_or_else(|| PathBuf::from("static"), PathBuf::from);

        let max_upload_bytes = parse_or_default(
            &lookup,
            "BIKESHOP_MAX_UPLOAD_BYTES",
            Ok(DEFAULT_MAX_UPLOAD_BYTES),
        )?;
        require_positive("BIKESHOP_MAX_UPLOAD_BYTES", max_upload_bytes)?;

        let db_max_connections =
            parse_or_default(&lookup, "BIKESHOP_DB_MAX_CONNECTIONS", Ok(5u32))?;
        require_positive("BIKESHOP_DB_MAX_CONNECTIONS", db_max_connections)?;

        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port,
            static_dir,
            max_upload_bytes,
            db_max_connections,
            log_json: lookup("BIKESHOP_LOG_JSON").is_some(),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Directory uploaded product images are written to.
    #[must_use]
    pub fn image_dir(&self) -> PathBuf {
        self.static_dir.join("images")
    }

    /// Path of the HTML front page served at `/`.
    #[must_use]
    pub fn index_file(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to a default when unset.
fn parse_or_default<T, F>(
    lookup: &F,
    key: &str,
    default: Result<T, T::Err>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let parsed = match lookup(key) {
        Some(raw) => raw.trim().parse::<T>(),
        None => default,
    };
    parsed.map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn require_positive<T>(key: &str, value: T) -> Result<(), ConfigError>
where
    T: PartialOrd + Default,
{
    if value > T::default() {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ))
    }
}
