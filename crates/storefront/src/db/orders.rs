//! Order repository.
//!
//! Orders are written in one transaction together with their lines and the
//! matching stock decrements.

use chrono::{DateTime, Utc};
use sable_core::order::{CustomerContact, OrderLine, PostalAddress};
use sable_core::{
    OrderId, OrderNumber, OrderStatus, OrderTotals, PaymentMethod, PlacedOrder, Price, ProductId,
    ShippingMethod,
};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{OrderSummary, StoredOrder};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: OrderNumber,
    status: OrderStatus,
    email: String,
    phone: String,
    shipping_first_name: String,
    shipping_last_name: String,
    shipping_address: String,
    shipping_city: String,
    shipping_postal_code: String,
    billing_first_name: String,
    billing_last_name: String,
    billing_address: String,
    billing_city: String,
    billing_postal_code: String,
    shipping_method: ShippingMethod,
    payment_method: PaymentMethod,
    subtotal: Price,
    savings: Price,
    shipping_cost: Price,
    tax: Price,
    total: Price,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    product_id: ProductId,
    name: String,
    unit_price: Price,
    original_price: Price,
    quantity: i32,
    selected_color: Option<String>,
    selected_storage: Option<String>,
    image: String,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid line quantity {}", row.quantity))
        })?;
        Ok(Self {
            product_id: row.product_id,
            name: row.name,
            unit_price: row.unit_price,
            original_price: row.original_price,
            quantity,
            selected_color: row.selected_color,
            selected_storage: row.selected_storage,
            image: row.image,
        })
    }
}

impl OrderRow {
    fn into_stored(self, items: Vec<OrderLine>) -> StoredOrder {
        StoredOrder {
            id: self.id,
            order: PlacedOrder {
                order_number: self.order_number,
                placed_at: self.created_at,
                status: self.status,
                items,
                contact: CustomerContact {
                    email: self.email,
                    phone: self.phone,
                },
                shipping_address: PostalAddress {
                    first_name: self.shipping_first_name,
                    last_name: self.shipping_last_name,
                    address: self.shipping_address,
                    city: self.shipping_city,
                    postal_code: self.shipping_postal_code,
                },
                billing_address: PostalAddress {
                    first_name: self.billing_first_name,
                    last_name: self.billing_last_name,
                    address: self.billing_address,
                    city: self.billing_city,
                    postal_code: self.billing_postal_code,
                },
                shipping_method: self.shipping_method,
                payment_method: self.payment_method,
                totals: OrderTotals {
                    subtotal: self.subtotal,
                    savings: self.savings,
                    shipping: self.shipping_cost,
                    tax: self.tax,
                    total: self.total,
                },
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    order_number: OrderNumber,
    email: String,
    status: OrderStatus,
    total: Price,
    item_count: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            email: row.email,
            status: row.status,
            total: row.total,
            item_count: row.item_count,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for persisted orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order, its lines, and decrement stock for every line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientStock` if any line would take
    /// stock below zero and `RepositoryError::OutOfRange` if a line does not
    /// fit its columns; nothing is written in either case.
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(&self, order: &PlacedOrder) -> Result<StoredOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: OrderId = sqlx::query_scalar(
            r#"
            INSERT INTO storefront.order (
                order_number, status, email, phone,
                shipping_first_name, shipping_last_name, shipping_address,
                shipping_city, shipping_postal_code,
                billing_first_name, billing_last_name, billing_address,
                billing_city, billing_postal_code,
                shipping_method, payment_method,
                subtotal, savings, shipping_cost, tax, total, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING id
            "#,
        )
        .bind(&order.order_number)
        .bind(order.status)
        .bind(&order.contact.email)
        .bind(&order.contact.phone)
        .bind(&order.shipping_address.first_name)
        .bind(&order.shipping_address.last_name)
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.postal_code)
        .bind(&order.billing_address.first_name)
        .bind(&order.billing_address.last_name)
        .bind(&order.billing_address.address)
        .bind(&order.billing_address.city)
        .bind(&order.billing_address.postal_code)
        .bind(order.shipping_method)
        .bind(order.payment_method)
        .bind(order.totals.subtotal)
        .bind(order.totals.savings)
        .bind(order.totals.shipping)
        .bind(order.totals.tax)
        .bind(order.totals.total)
        .bind(order.placed_at)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in order.items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| RepositoryError::OutOfRange("too many order lines".to_string()))?;
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::OutOfRange(format!("quantity too large for {}", line.product_id))
            })?;

            sqlx::query(
                r"
                INSERT INTO storefront.order_line (
                    order_id, position, product_id, name, unit_price, original_price,
                    quantity, selected_color, selected_storage, image
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(id)
            .bind(position)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.unit_price)
            .bind(line.original_price)
            .bind(quantity)
            .bind(&line.selected_color)
            .bind(&line.selected_storage)
            .bind(&line.image)
            .execute(&mut *tx)
            .await?;

            let updated = sqlx::query(
                r"
                UPDATE storefront.product
                SET stock = stock - $2, updated_at = NOW()
                WHERE id = $1 AND stock >= $2
                ",
            )
            .bind(&line.product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                // Dropping the transaction rolls it back
                return Err(RepositoryError::InsufficientStock(line.product_id.clone()));
            }
        }

        tx.commit().await?;

        Ok(StoredOrder {
            id,
            order: order.clone(),
        })
    }

    /// Get an order and its lines by order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<StoredOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, order_number, status, email, phone,
                   shipping_first_name, shipping_last_name, shipping_address,
                   shipping_city, shipping_postal_code,
                   billing_first_name, billing_last_name, billing_address,
                   billing_city, billing_postal_code,
                   shipping_method, payment_method,
                   subtotal, savings, shipping_cost, tax, total, created_at
            FROM storefront.order
            WHERE order_number = $1
            "#,
        )
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT product_id, name, unit_price, original_price, quantity,
                   selected_color, selected_storage, image
            FROM storefront.order_line
            WHERE order_id = $1
            ORDER BY position
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let items = lines
            .into_iter()
            .map(OrderLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(row.into_stored(items)))
    }

    /// List the most recent orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r#"
            SELECT o.id, o.order_number, o.email, o.status, o.total, o.created_at,
                   COALESCE(SUM(l.quantity), 0)::BIGINT AS item_count
            FROM storefront.order o
            LEFT JOIN storefront.order_line l ON l.order_id = o.id
            GROUP BY o.id
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
