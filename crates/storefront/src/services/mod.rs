//! Business logic services for storefront.
//!
//! # Services
//!
//! - `shopper` - Per-session cart, checkout flow and order history
//! - `payment` - Simulated card payments that fail over to bank transfer
//! - `catalog` - Cached product and bank-details reads
//! - `orders` - Server-side order submission with stock checks

pub mod catalog;
pub mod orders;
pub mod payment;
pub mod shopper;

pub use catalog::{CatalogError, CatalogService};
pub use orders::{OrderError, OrderReceipt, OrderService, OrderSubmission};
pub use payment::CardPaymentSimulator;
pub use shopper::{OrderHistory, Shopper, ShopperSession, ShopperStore};
