//! JSON API backed by the database.
//!
//! Unlike the session routes, nothing here depends on the shopper: the
//! catalog is read through the cache and orders are priced and stocked on
//! the server.

pub mod catalog;
pub mod orders;
