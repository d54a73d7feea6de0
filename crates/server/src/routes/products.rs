//! Product catalog route handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Path, State,
        multipart::MultipartRejection,
        rejection::PathRejection,
    },
};
use tracing::{instrument, warn};

use bikeshop_core::ProductId;

use super::{CreatedResponse, MessageResponse};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Product, ProductDraft, ProductValidationError};
use crate::state::AppState;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Raw multipart fields of a product submission.
#[derive(Debug, Default)]
struct ProductForm {
    title: Option<String>,
    description: Option<String>,
    price: Option<String>,
    image: Option<ImageField>,
}

#[derive(Debug)]
struct ImageField {
    file_name: Option<String>,
    bytes: Bytes,
}

/// A validated product submission.
#[derive(Debug)]
struct ProductUpload {
    draft: ProductDraft,
    image_name: String,
    image: Bytes,
}

impl ProductForm {
    /// Collect the known fields from a multipart body. Unknown fields are skipped.
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "title" => form.title = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "price" => form.price = Some(field.text().await?),
                "image" => {
                    let file_name = field.file_name().map(ToOwned::to_owned);
                    let bytes = field.bytes().await?;
                    form.image = Some(ImageField { file_name, bytes });
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn validate(self) -> std::result::Result<ProductUpload, ProductValidationError> {
        let title = self
            .title
            .ok_or(ProductValidationError::MissingField("title"))?;
        let description = self
            .description
            .ok_or(ProductValidationError::MissingField("description"))?;
        let price = self
            .price
            .ok_or(ProductValidationError::MissingField("price"))?;
        let image = self
            .image
            .ok_or(ProductValidationError::MissingField("image"))?;

        let draft = ProductDraft::new(&title, &description, &price)?;

        let image_name = image
            .file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ProductValidationError::MissingImageName)?;
        if image.bytes.is_empty() {
            return Err(ProductValidationError::EmptyImage);
        }

        Ok(ProductUpload {
            draft,
            image_name,
            image: image.bytes,
        })
    }
}

/// Create a product from a multipart form (`title`, `description`, `price`, `image`).
///
/// The image is written before the row is inserted; if the insert fails the
/// file is removed again.
///
/// # Errors
///
/// Returns 422 for a malformed form, 413 for an oversized upload, and 500 if
/// storage or the database fails.
#[instrument(skip(state, multipart))]
pub async fn create(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<CreatedResponse<ProductId>>> {
    let upload = ProductForm::read(multipart?).await?.validate()?;

    let stored = state
        .images()
        .save(&upload.image_name, &upload.image)
        .await?;
    let new_product = upload.draft.with_image(stored.public_path.clone());

    match ProductRepository::new(state.pool()).create(&new_product).await {
        Ok(product) => Ok(Json(CreatedResponse {
            message: "Product created successfully",
            id: product.id,
        })),
        Err(e) => {
            if let Err(cleanup) = state.images().remove(&stored).await {
                warn!(error = %cleanup, file = %stored.file_name, "Failed to remove orphaned image");
            }
            Err(e.into())
        }
    }
}

/// List all products in insertion order.
///
/// # Errors
///
/// Returns 500 if the database query fails.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Get a single product.
///
/// # Errors
///
/// Returns 404 if the product does not exist, 422 for a non-numeric ID.
#[instrument(skip(state, path))]
pub async fn show(
    State(state): State<AppState>,
    path: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>> {
    let Path(id) = path?;

    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(PRODUCT_NOT_FOUND.to_string()))
}

/// Delete a product.
///
/// The stored image and cart rows referencing the product are kept.
///
/// # Errors
///
/// Returns 404 if the product does not exist, 422 for a non-numeric ID.
#[instrument(skip(state, path))]
pub async fn delete(
    State(state): State<AppState>,
    path: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = path?;

    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, PRODUCT_NOT_FOUND))?;

    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}
