//! Persisted order types.

use chrono::{DateTime, Utc};
use sable_core::{OrderId, OrderNumber, OrderStatus, PlacedOrder, Price};
use serde::Serialize;

/// An order as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredOrder {
    pub id: OrderId,
    #[serde(flatten)]
    pub order: PlacedOrder,
}

/// One row of an order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub email: String,
    pub status: OrderStatus,
    pub total: Price,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}
