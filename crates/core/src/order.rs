//! Denormalized order records.
//!
//! A [`PlacedOrder`] copies everything it needs by value so that later
//! catalog or profile edits never change what the customer bought.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::checkout::form::AddressFields;
use crate::pricing::OrderTotals;
use crate::types::{OrderNumber, OrderStatus, PaymentMethod, Price, ProductId, ShippingMethod};

/// A purchased line, frozen at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub original_price: Price,
    pub quantity: u32,
    pub selected_color: Option<String>,
    pub selected_storage: Option<String>,
    pub image: String,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.id.clone(),
            name: line.name.clone(),
            unit_price: line.price,
            original_price: line.original_price,
            quantity: line.quantity,
            selected_color: line.selected_color.clone(),
            selected_storage: line.selected_storage.clone(),
            image: line.image.clone(),
        }
    }
}

/// How to reach the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub email: String,
    pub phone: String,
}

/// A postal address on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl From<&AddressFields> for PostalAddress {
    fn from(fields: &AddressFields) -> Self {
        Self {
            first_name: fields.first_name.trim().to_owned(),
            last_name: fields.last_name.trim().to_owned(),
            address: fields.address.trim().to_owned(),
            city: fields.city.trim().to_owned(),
            postal_code: fields.postal_code.trim().to_owned(),
        }
    }
}

/// An order produced by the checkout wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_number: OrderNumber,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub contact: CustomerContact,
    pub shipping_address: PostalAddress,
    pub billing_address: PostalAddress,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub totals: OrderTotals,
}

impl PlacedOrder {
    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
