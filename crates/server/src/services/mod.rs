//! Services that sit beside the database.
//!
//! # Services
//!
//! - `images` - Local storage for uploaded product images

pub mod images;

pub use images::{ImageStore, ImageStoreError, StoredImage};
