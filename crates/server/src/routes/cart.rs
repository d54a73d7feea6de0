//! Cart route handlers.
//!
//! The cart is global (no sessions). Rows are addressed by product ID, and
//! update/remove act on every row for that product.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;
use tracing::instrument;

use bikeshop_core::ProductId;

use super::MessageResponse;
use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::models::CartItem;
use crate::state::AppState;

const NOT_IN_CART: &str = "Product not found in cart";

/// Query parameters for adding to the cart.
#[derive(Debug, Deserialize)]
pub struct AddToCartQuery {
    pub product_id: ProductId,
}

/// Query parameters for updating a cart quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityQuery {
    pub quantity: i64,
}

/// Add a product to the cart (`POST /cart?product_id=`).
///
/// Always inserts a new row with quantity 1, even if the product does not exist.
///
/// # Errors
///
/// Returns 422 if `product_id` is missing or not an integer.
#[instrument(skip(state, query))]
pub async fn add(
    State(state): State<AppState>,
    query: std::result::Result<Query<AddToCartQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>> {
    let Query(AddToCartQuery { product_id }) = query?;

    CartRepository::new(state.pool()).add(product_id).await?;

    Ok(Json(MessageResponse {
        message: "Product added to cart successfully",
    }))
}

/// List all cart rows in insertion order.
///
/// # Errors
///
/// Returns 500 if the database query fails.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).list().await?;
    Ok(Json(items))
}

/// Set the quantity for a product in the cart (`PUT /cart/{product_id}?quantity=`).
///
/// # Errors
///
/// Returns 404 if the product is not in the cart, 422 for a missing or
/// negative quantity. Earlier releases stored any integer, negatives
/// included; those are now refused before the cart is touched. Zero is
/// still accepted and kept as a row.
#[instrument(skip(state, path, query))]
pub async fn update(
    State(state): State<AppState>,
    path: std::result::Result<Path<ProductId>, PathRejection>,
    query: std::result::Result<Query<UpdateQuantityQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(product_id) = path?;
    let Query(UpdateQuantityQuery { quantity }) = query?;

    if quantity < 0 {
        return Err(AppError::Validation(
            "quantity cannot be negative".to_string(),
        ));
    }

    CartRepository::new(state.pool())
        .update_quantity(product_id, quantity)
        .await
        .map_err(|e| AppError::from_repository(e, NOT_IN_CART))?;

    Ok(Json(MessageResponse {
        message: "Cart item updated successfully",
    }))
}

/// Remove every cart row for a product.
///
/// # Errors
///
/// Returns 404 if the product is not in the cart.
#[instrument(skip(state, path))]
pub async fn remove(
    State(state): State<AppState>,
    path: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(product_id) = path?;

    CartRepository::new(state.pool())
        .remove(product_id)
        .await
        .map_err(|e| AppError::from_repository(e, NOT_IN_CART))?;

    Ok(Json(MessageResponse {
        message: "Product removed from cart successfully",
    }))
}
