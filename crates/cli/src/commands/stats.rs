//! Catalog and cart statistics.

use tracing::{info, warn};

use bikeshop_server::config::ServerConfig;
use bikeshop_server::db::{self, CartRepository, ProductRepository, RepositoryError};

/// Row counts reported by `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub products: i64,
    pub cart_rows: i64,
    /// Cart rows whose product no longer exists.
    pub dangling_cart_rows: i64,
}

/// Collect statistics from an open pool.
///
/// # Errors
///
/// Returns an error if any count query fails.
pub async fn collect(pool: &sqlx::SqlitePool) -> Result<Stats, RepositoryError> {
    let cart = CartRepository::new(pool);

    Ok(Stats {
        products: ProductRepository::new(pool).count().await?,
        cart_rows: cart.count().await?,
        dangling_cart_rows: cart.count_dangling().await?,
    })
}

/// Apply pending migrations, then collect statistics.
///
/// A database that has never been migrated reports zero rows.
///
/// # Errors
///
/// Returns an error if a migration or a count query fails.
pub async fn migrate_and_collect(
    pool: &sqlx::SqlitePool,
) -> Result<Stats, Box<dyn std::error::Error>> {
    db::migrate(pool).await?;
    Ok(collect(pool).await?)
}

/// Print statistics for the configured database.
///
/// # Errors
///
/// Returns an error if the database connection, a migration or a query fails.
pub async fn run(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    let stats = migrate_and_collect(&pool).await;
    pool.close().await;
    let stats = stats?;

    info!("Bikeshop Statistics");
    info!("===================");
    info!("Products: {}", stats.products);
    info!("Cart rows: {}", stats.cart_rows);
    if stats.dangling_cart_rows > 0 {
        warn!(
            "Cart rows referencing deleted products: {}",
            stats.dangling_cart_rows
        );
    } else {
        info!("Cart rows referencing deleted products: 0");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bikeshop_server::models::ProductDraft;

    use super::*;

    #[tokio::test]
    async fn test_fresh_database_reports_zeros() {
        let pool = db::create_memory_pool().await.unwrap();

        let stats = migrate_and_collect(&pool).await.unwrap();
        assert_eq!(
            stats,
            Stats {
                products: 0,
                cart_rows: 0,
                dangling_cart_rows: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_collect_counts_dangling_rows() {
        let pool = db::create_memory_pool().await.unwrap();
        db::migrate(&pool).await.unwrap();

        let products = ProductRepository::new(&pool);
        let kept = products
            .create(
                &ProductDraft::new("Kept", "", "10")
                    .unwrap()
                    .with_image("static/images/kept.jpg".to_string()),
            )
            .await
            .unwrap();
        let gone = products
            .create(
                &ProductDraft::new("Gone", "", "20")
                    .unwrap()
                    .with_image("static/images/gone.jpg".to_string()),
            )
            .await
            .unwrap();

        let cart = CartRepository::new(&pool);
        cart.add(kept.id).await.unwrap();
        cart.add(gone.id).await.unwrap();
        cart.add(gone.id).await.unwrap();
        products.delete(gone.id).await.unwrap();

        let stats = collect(&pool).await.unwrap();
        assert_eq!(
            stats,
            Stats {
                products: 1,
                cart_rows: 3,
                dangling_cart_rows: 2,
            }
        );
    }
}
