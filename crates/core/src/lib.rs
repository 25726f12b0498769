//! Sable Core - Cart store, checkout flow and shared types.
//!
//! This crate holds everything about a shopper's purchase that can be
//! expressed without I/O. It is shared by:
//! - `sable-storefront` - JSON storefront server that owns one cart and one checkout per shopper
//! - `sable-cli` - Command-line tools for migrations, seeding and order listings
//!
//! # Architecture
//!
//! Every state change here is a pure function from the old state to a new
//! one. There are no clocks, no random sources and no database handles: the
//! storefront passes timestamps, order numbers and prices in. This keeps the
//! cart and the checkout wizard trivially testable and replayable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and order numbers
//! - [`cart`] - The cart store: line items keyed by product and variant
//! - [`checkout`] - The four-step checkout wizard and its step gates
//! - [`pricing`] - Tax and shipping rules plus derived totals
//! - [`order`] - Denormalized order records produced by checkout

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod order;
pub mod pricing;
pub mod types;

pub use cart::{CartAction, CartLine, CartLineError, CartState, LineKey, NewCartLine};
pub use checkout::{Advance, CheckoutError, CheckoutFlow, CheckoutStep};
pub use order::PlacedOrder;
pub use pricing::{CartTotals, OrderTotals, PricingRules};
pub use types::*;
