//! Product repository for database operations.

use sqlx::SqlitePool;
use tracing::{debug, info};

use bikeshop_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Raw `products` row as stored in SQLite.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    description: String,
    price: f64,
    image_path: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::from_f64(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price,
            image_path: row.image_path,
        })
    }
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a product and return it with its generated ID.
    ///
    /// Only the ID is read back, so an `Err` always means nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO products (title, description, price, image_path)
            VALUES (?, ?, ?, ?)
            RETURNING id
            ",
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price.to_f64())
        .bind(&product.image_path)
        .fetch_one(self.pool)
        .await?;

        info!(product_id = %id, title = %product.title, "Product created");
        Ok(Product {
            id,
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
            image_path: product.image_path.clone(),
        })
    }

    /// List every product in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, description, price, image_path
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed products");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored price is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, description, price, image_path
            FROM products
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Delete a product by its ID.
    ///
    /// The stored image and any cart rows referencing the product are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Count products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
