//! Domain models for the catalog and cart.
//!
//! These types are what handlers serialize; database row types stay private
//! to the repositories in [`crate::db`].

pub mod cart;
pub mod product;

pub use cart::CartItem;
pub use product::{NewProduct, Product, ProductDraft, ProductValidationError};
