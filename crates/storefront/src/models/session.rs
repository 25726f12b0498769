//! Session-related types.
//!
//! The session cookie only carries an opaque shopper id. Cart, checkout and
//! order history live in [`crate::services::ShopperStore`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key into the shopper store, stored in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopperId(Uuid);

impl ShopperId {
    /// A fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ShopperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Session keys.
pub mod keys {
    /// Key for the shopper id.
    pub const SHOPPER_ID: &str = "shopper_id";
}
