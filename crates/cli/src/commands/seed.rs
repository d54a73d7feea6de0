//! Seed the product catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - title: Trek 520
//!     description: Steel touring bike
//!     price: 899.99
//!     image: images/trek-520.jpg
//! ```
//!
//! Image paths are resolved relative to the YAML file. Each image is copied
//! into the image store with the same naming rules as HTTP uploads, so an
//! existing file is never overwritten. The whole file is validated before the
//! database is opened.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info, warn};

use bikeshop_server::config::ServerConfig;
use bikeshop_server::db::{self, ProductRepository, RepositoryError};
use bikeshop_server::models::{NewProduct, ProductDraft};
use bikeshop_server::services::images::{ImageStore, ImageStoreError, PUBLIC_IMAGE_PREFIX};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The YAML could not be parsed.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more entries failed validation.
    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),

    /// Could not open the database.
    #[error("database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    /// Could not apply migrations.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Inserting a product failed.
    #[error("failed to insert product: {0}")]
    Repository(#[from] RepositoryError),

    /// Copying an image failed.
    #[error(transparent)]
    Storage(#[from] ImageStoreError),
}

/// Top-level shape of the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// One product entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: SeedPrice,
    /// Path to the image file, relative to the seed file.
    pub image: PathBuf,
}

/// Prices may be written as YAML numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SeedPrice {
    Number(f64),
    Text(String),
}

impl SeedPrice {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// A seed entry that passed validation.
#[derive(Debug)]
pub struct ValidatedEntry {
    pub draft: ProductDraft,
    pub image: PathBuf,
}

/// Outcome of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
}

/// Parse a seed file.
///
/// # Errors
///
/// Returns `SeedError::Yaml` if the content does not match the expected shape.
pub fn parse_catalog(content: &str) -> Result<SeedCatalog, SeedError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Validate every entry, resolving image paths against `base_dir`.
///
/// # Errors
///
/// Returns `SeedError::Invalid` listing every problem found.
pub fn validate_catalog(
    catalog: SeedCatalog,
    base_dir: &Path,
) -> Result<Vec<ValidatedEntry>, SeedError> {
    let mut entries = Vec::with_capacity(catalog.products.len());
    let mut errors = Vec::new();

    for (index, product) in catalog.products.into_iter().enumerate() {
        let label = format!("products[{index}] ({})", product.title.trim());

        let draft = match ProductDraft::new(
            &product.title,
            &product.description,
            &product.price.as_text(),
        ) {
            Ok(draft) => draft,
            Err(e) => {
                errors.push(format!("{label}: {e}"));
                continue;
            }
        };

        let image = base_dir.join(&product.image);
        if !image.is_file() {
            errors.push(format!("{label}: image not found: {}", image.display()));
            continue;
        }

        entries.push(ValidatedEntry { draft, image });
    }

    if errors.is_empty() {
        Ok(entries)
    } else {
        Err(SeedError::Invalid(errors))
    }
}

/// Copy images and insert products, in file order.
///
/// An image copied for a product whose insert fails is removed again.
///
/// # Errors
///
/// Returns the first storage or database error; earlier products stay inserted.
pub async fn seed_entries(
    pool: &SqlitePool,
    images: &ImageStore,
    entries: Vec<ValidatedEntry>,
) -> Result<SeedSummary, SeedError> {
    images.ensure_dir().await?;
    let products = ProductRepository::new(pool);
    let mut summary = SeedSummary::default();

    for entry in entries {
        let bytes = tokio::fs::read(&entry.image)
            .await
            .map_err(|source| SeedError::Read {
                path: entry.image.clone(),
                source,
            })?;
        let file_name = entry
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let stored = images.save(&file_name, &bytes).await?;
        let new_product: NewProduct = entry.draft.with_image(stored.public_path.clone());

        match products.create(&new_product).await {
            Ok(product) => {
                info!(id = %product.id, title = %product.title, image = %product.image_path, "Seeded product");
                summary.inserted += 1;
            }
            Err(e) => {
                if let Err(cleanup) = images.remove(&stored).await {
                    warn!(error = %cleanup, file = %stored.file_name, "Failed to remove orphaned image");
                }
                return Err(e.into());
            }
        }
    }

    Ok(summary)
}

/// Seed the catalog described in `file`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or if storage or
/// database operations fail.
pub async fn run(config: &ServerConfig, file: &Path, images_dir: PathBuf) -> Result<(), SeedError> {
    info!(path = %file.display(), "Loading catalog from file");

    // Read and validate before touching the database
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| SeedError::Read {
            path: file.to_path_buf(),
            source,
        })?;
    let catalog = parse_catalog(&content)?;
    info!(products = catalog.products.len(), "Parsed catalog");

    let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
    let entries = validate_catalog(catalog, base_dir).inspect_err(|e| {
        if let SeedError::Invalid(errors) = e {
            error!("Catalog validation failed:");
            for err in errors {
                error!("  - {err}");
            }
        }
    })?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::migrate(&pool).await?;
    info!("Connected to database");

    let images = ImageStore::new(images_dir, PUBLIC_IMAGE_PREFIX);
    let result = seed_entries(&pool, &images, entries).await;
    pool.close().await;

    let summary = result?;
    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    Ok(())
}
