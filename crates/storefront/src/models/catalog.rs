//! Catalog domain types.

use sable_core::{BankAccountId, NewCartLine, Price, ProductId};
use serde::{Deserialize, Serialize};

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Reference price used to show savings.
    pub original_price: Price,
    /// Units available. Never negative.
    pub stock: u32,
    pub image_url: String,
    pub colors: Vec<String>,
    pub storage_options: Vec<String>,
}

impl Product {
    /// Offer this product to the cart with the chosen variant.
    #[must_use]
    pub fn to_cart_line(
        &self,
        selected_color: Option<String>,
        selected_storage: Option<String>,
    ) -> NewCartLine {
        NewCartLine {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            original_price: self.original_price,
            image: self.image_url.clone(),
            selected_color,
            selected_storage,
        }
    }
}

/// Bank-transfer account shown on the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub id: BankAccountId,
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub bank_address: String,
}
