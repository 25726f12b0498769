//! Cart line items and the variant key that identifies them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MAX_UNIT_PRICE, Price, ProductId};

/// A client-supplied line that cannot go into a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartLineError {
    #[error("{0} must be between 0 and {MAX_UNIT_PRICE}")]
    PriceOutOfRange(&'static str),
}

/// Identity of a cart line: product plus selected variant.
///
/// Two adds with equal keys collapse into one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub id: ProductId,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_storage: Option<String>,
}

/// A product as offered to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub original_price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_storage: Option<String>,
}

impl NewCartLine {
    /// The line key this product would occupy.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            selected_color: self.selected_color.clone(),
            selected_storage: self.selected_storage.clone(),
        }
    }

    /// Check that both prices are within [`Price::is_valid_unit_price`].
    ///
    /// # Errors
    ///
    /// [`CartLineError::PriceOutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), CartLineError> {
        if !self.price.is_valid_unit_price() {
            return Err(CartLineError::PriceOutOfRange("price"));
        }
        if !self.original_price.is_valid_unit_price() {
            return Err(CartLineError::PriceOutOfRange("original_price"));
        }
        Ok(())
    }

    pub(crate) fn with_quantity(self, quantity: u32) -> CartLine {
        CartLine {
            id: self.id,
            name: self.name,
            price: self.price,
            original_price: self.original_price,
            image: self.image,
            selected_color: self.selected_color,
            selected_storage: self.selected_storage,
            quantity,
        }
    }
}

/// One line in the cart.
///
/// `quantity` is always at least 1 while the line is in a [`super::CartState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub original_price: Price,
    pub image: String,
    pub selected_color: Option<String>,
    pub selected_storage: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Whether this line occupies `key`.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.id == key.id
            && self.selected_color == key.selected_color
            && self.selected_storage == key.selected_storage
    }

    /// The key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            id: self.id.clone(),
            selected_color: self.selected_color.clone(),
            selected_storage: self.selected_storage.clone(),
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// `(original_price − price) × quantity`.
    ///
    /// Negative when a line is priced above its reference price.
    #[must_use]
    pub fn line_savings(&self) -> Price {
        (self.original_price - self.price).times(self.quantity)
    }
}
