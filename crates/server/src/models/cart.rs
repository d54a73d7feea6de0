//! Cart domain types.

use serde::{Deserialize, Serialize};

use bikeshop_core::{CartItemId, ProductId};

/// Quantity assigned to a freshly added cart row.
pub const DEFAULT_QUANTITY: i64 = 1;

/// A row in the shopping cart.
///
/// The cart is a multiset: adding the same product twice yields two rows.
/// `product_id` is a weak reference and may point at a deleted product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    /// Unique cart row ID.
    pub id: CartItemId,
    /// Referenced product (not enforced to exist).
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: i64,
}
