//! Bikeshop Core - Shared types library.
//!
//! This crate provides common types used across all bikeshop components:
//! - `server` - REST API for the product catalog and shopping cart
//! - `cli` - Command-line tools for migrations, seeding and statistics
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP handling. Database encoding for IDs is behind the `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
