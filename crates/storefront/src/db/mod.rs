//! Database operations for storefront `PostgreSQL`.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `product` - Catalog products with stock and variant options
//! - `bank_details` - Bank-transfer account shown at checkout (one active row)
//! - `order` - Orders written through `POST /api/orders`
//! - `order_line` - Denormalized line items of an order
//!
//! Carts, checkout forms and session order history are never stored here.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p sable-cli -- migrate storefront
//! ```

pub mod bank_details;
pub mod orders;
pub mod products;

use std::time::Duration;

use sable_core::ProductId;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use bank_details::{BankDetailsRepository, NewBankDetails};
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Stock for this product would go negative.
    #[error("insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// A value does not fit its column.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool that connects on first use.
///
/// Routes that never touch the database work without one, and routes that
/// do fail after `acquire_timeout`.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(
    database_url: &secrecy::SecretString,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url.expose_secret())
}
