//! Server-side order submission.
//!
//! Backs `POST /api/orders`. Unlike the session checkout, this path trusts
//! nothing the client computed: prices and stock come from the catalog and
//! totals are recomputed before the order is written.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use sable_core::checkout::AddressFields;
use sable_core::order::{CustomerContact, OrderLine, PostalAddress};
use sable_core::{
    Email, EmailError, OrderId, OrderNumber, OrderStatus, OrderTotals, PaymentMethod, PlacedOrder,
    PricingRules, ProductId, ShippingMethod,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::Product;

/// Errors from order submission.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("order must contain at least one item")]
    NoItems,

    #[error("quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductId),

    #[error("product not found: {0}")]
    UnknownProduct(ProductId),

    #[error("only {available} of product {product_id} in stock (requested {requested})")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One requested line.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_storage: Option<String>,
}

/// Request body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSubmission {
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub shipping_address: AddressFields,
    /// Defaults to the shipping address.
    #[serde(default)]
    pub billing_address: Option<AddressFields>,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemRequest>,
    /// What the client believes the totals are. Logged when it disagrees.
    #[serde(default)]
    pub client_totals: Option<OrderTotals>,
}

/// Response body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub totals: OrderTotals,
}

/// A submission that passed the checks that need no database.
#[derive(Debug)]
pub struct ValidatedSubmission {
    email: Email,
    items: Vec<(OrderItemRequest, u32)>,
    submission: OrderSubmission,
}

impl ValidatedSubmission {
    /// Check the email and item quantities.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidEmail`, `OrderError::NoItems` or
    /// `OrderError::InvalidQuantity`.
    pub fn new(submission: OrderSubmission) -> Result<Self, OrderError> {
        let email = Email::parse(&submission.email)?;

        if submission.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let items = submission
            .items
            .iter()
            .map(|item| {
                u32::try_from(item.quantity)
                    .ok()
                    .filter(|quantity| *quantity >= 1)
                    .map(|quantity| (item.clone(), quantity))
                    .ok_or_else(|| OrderError::InvalidQuantity(item.product_id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            email,
            items,
            submission,
        })
    }

    /// Units requested per product, across variants.
    fn requested_per_product(&self) -> HashMap<&ProductId, u32> {
        let mut requested: HashMap<&ProductId, u32> = HashMap::new();
        for (item, quantity) in &self.items {
            let entry = requested.entry(&item.product_id).or_default();
            *entry = entry.saturating_add(*quantity);
        }
        requested
    }

    /// Map a failed order write. Stock taken by a concurrent order between
    /// the check and the write leaves nothing available.
    fn write_error(&self, err: RepositoryError) -> OrderError {
        match err {
            RepositoryError::InsufficientStock(product_id) => {
                let requested = self
                    .requested_per_product()
                    .get(&product_id)
                    .copied()
                    .unwrap_or_default();
                OrderError::InsufficientStock {
                    product_id,
                    requested,
                    available: 0,
                }
            }
            other => OrderError::Repository(other),
        }
    }

    /// Build the order from catalog products.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::UnknownProduct` or `OrderError::InsufficientStock`.
    pub fn price(
        &self,
        products: &[Product],
        rules: &PricingRules,
        order_number: OrderNumber,
        placed_at: DateTime<Utc>,
    ) -> Result<PlacedOrder, OrderError> {
        let by_id: HashMap<&ProductId, &Product> =
            products.iter().map(|product| (&product.id, product)).collect();

        for (product_id, requested) in self.requested_per_product() {
            let product = by_id
                .get(product_id)
                .ok_or_else(|| OrderError::UnknownProduct(product_id.clone()))?;
            if requested > product.stock {
                return Err(OrderError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested,
                    available: product.stock,
                });
            }
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (item, quantity) in &self.items {
            let product = by_id
                .get(&item.product_id)
                .ok_or_else(|| OrderError::UnknownProduct(item.product_id.clone()))?;
            items.push(OrderLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                original_price: product.original_price,
                quantity: *quantity,
                selected_color: item.selected_color.clone(),
                selected_storage: item.selected_storage.clone(),
                image: product.image_url.clone(),
            });
        }

        let totals = OrderTotals::from_priced(
            items
                .iter()
                .map(|line| (line.unit_price, line.original_price, line.quantity)),
            self.submission.shipping_method,
            rules,
        );

        let shipping_address = PostalAddress::from(&self.submission.shipping_address);
        let billing_address = self
            .submission
            .billing_address
            .as_ref()
            .map_or_else(|| shipping_address.clone(), PostalAddress::from);

        Ok(PlacedOrder {
            order_number,
            placed_at,
            status: OrderStatus::Pending,
            items,
            contact: CustomerContact {
                email: self.email.as_str().to_owned(),
                phone: self.submission.phone.trim().to_owned(),
            },
            shipping_address,
            billing_address,
            shipping_method: self.submission.shipping_method,
            payment_method: self.submission.payment_method,
            totals,
        })
    }

    fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self
            .items
            .iter()
            .map(|(item, _)| item.product_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Writes orders with server-side pricing and stock checks.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    rules: PricingRules,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, rules: PricingRules) -> Self {
        Self { pool, rules }
    }

    /// Validate, price and persist a submission.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before the database is touched. Stock
    /// that runs out between the check and the write is reported as
    /// `OrderError::InsufficientStock`.
    #[instrument(skip_all, fields(items = submission.items.len()))]
    pub async fn submit(
        &self,
        submission: OrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<OrderReceipt, OrderError> {
        let validated = ValidatedSubmission::new(submission)?;

        let products = ProductRepository::new(self.pool)
            .get_many(&validated.product_ids())
            .await?;

        let order_number = OrderNumber::generate(now.year(), &mut rand::rng());
        let order = validated.price(&products, &self.rules, order_number, now)?;

        if let Some(client) = validated.submission.client_totals
            && client != order.totals
        {
            tracing::warn!(
                client_total = %client.total,
                server_total = %order.totals.total,
                "Client totals disagree with server; using server totals"
            );
        }

        let stored = OrderRepository::new(self.pool)
            .create(&order)
            .await
            .map_err(|err| validated.write_error(err))?;

        tracing::info!(
            order_id = %stored.id,
            order_number = %stored.order.order_number,
            total = %stored.order.totals.total,
            "Order created"
        );

        Ok(OrderReceipt {
            id: stored.id,
            order_number: stored.order.order_number,
            totals: stored.order.totals,
        })
    }
}
