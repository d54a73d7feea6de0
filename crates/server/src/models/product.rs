//! Product domain types.
//!
//! These types represent validated domain objects separate from database row types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bikeshop_core::{Price, PriceError, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Non-negative unit price.
    pub price: Price,
    /// Public path of the product image (e.g. `static/images/bike.jpg`).
    pub image_path: String,
}

/// Reasons a product submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductValidationError {
    /// A required form field was not sent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The title is empty or only whitespace.
    #[error("title cannot be blank")]
    BlankTitle,

    /// The price is not a valid non-negative number.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// The uploaded image has no filename.
    #[error("image must have a filename")]
    MissingImageName,

    /// The uploaded image is empty.
    #[error("image cannot be empty")]
    EmptyImage,
}

/// Validated product fields, before the image has been stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: Price,
}

impl ProductDraft {
    /// Validate raw product fields.
    ///
    /// The title is trimmed and must not be blank. The description is kept
    /// verbatim. The price must parse as a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns `ProductValidationError` describing the first invalid field.
    pub fn new(title: &str, description: &str, price: &str) -> Result<Self, ProductValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ProductValidationError::BlankTitle);
        }

        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            price: Price::parse(price)?,
        })
    }

    /// Attach the stored image path, producing an insertable product.
    #[must_use]
    pub fn with_image(self, image_path: String) -> NewProduct {
        NewProduct {
            title: self.title,
            description: self.description,
            price: self.price,
            image_path,
        }
    }
}

/// A product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub image_path: String,
}
