//! Domain models for storefront.
//!
//! These types represent validated domain objects separate from database row types.

pub mod catalog;
pub mod order;
pub mod session;

pub use catalog::{BankDetails, Product};
pub use order::{OrderSummary, StoredOrder};
