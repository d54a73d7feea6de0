//! Cart repository for database operations.
//!
//! Rows are addressed by `product_id`, not by their own ID. Because
//! add-to-cart never merges rows, updates and removals apply to every row
//! for the product.

use sqlx::SqlitePool;
use tracing::info;

use bikeshop_core::ProductId;

use super::RepositoryError;
use crate::models::CartItem;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product to the cart as a new row.
    ///
    /// The product is not required to exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(&self, product_id: ProductId) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO cart (product_id)
            VALUES (?)
            RETURNING id, product_id, quantity
            ",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        info!(cart_item_id = %item.id, product_id = %product_id, "Product added to cart");
        Ok(item)
    }

    /// List every cart row in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT id, product_id, quantity
            FROM cart
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Set the quantity of every cart row for a product.
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE cart SET quantity = ? WHERE product_id = ?")
            .bind(quantity)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        let updated = result.rows_affected();
        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(product_id = %product_id, quantity, rows = updated, "Cart quantity updated");
        Ok(updated)
    }

    /// Remove every cart row for a product.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, product_id: ProductId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart WHERE product_id = ?")
            .bind(product_id)
            .execute(self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(product_id = %product_id, rows = removed, "Product removed from cart");
        Ok(removed)
    }

    /// Count cart rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cart")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count cart rows whose product no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_dangling(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM cart
            LEFT JOIN products ON products.id = cart.product_id
            WHERE products.id IS NULL
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
