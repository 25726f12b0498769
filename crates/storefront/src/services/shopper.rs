//! Per-shopper state.
//!
//! Each browser session owns one [`Shopper`]: a cart, a checkout flow and
//! the orders placed during the session. Shoppers live in a [`ShopperStore`]
//! keyed by the [`ShopperId`] kept in the session cookie, and are dropped
//! when the session idles out or is ended explicitly.
//!
//! Every shopper has a lifetime [`CancellationToken`] derived from the
//! application shutdown token. Ending the session or shutting down the
//! server cancels it, which in turn cancels any pending card-payment timer.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::notification::RemovalCause;
use sable_core::{CartState, CheckoutFlow, OrderNumber, PlacedOrder};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::models::session::ShopperId;

/// Orders placed during this session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderHistory {
    /// The most recent order, shown on the confirmation page.
    pub current_order: Option<PlacedOrder>,
    /// Every order placed this session, oldest first.
    pub all_orders: Vec<PlacedOrder>,
}

impl OrderHistory {
    /// Record a newly placed order in both slots.
    pub fn record(&mut self, order: PlacedOrder) {
        self.all_orders.push(order.clone());
        self.current_order = Some(order);
    }

    /// Look up an order by its number.
    #[must_use]
    pub fn find(&self, order_number: &OrderNumber) -> Option<&PlacedOrder> {
        self.all_orders
            .iter()
            .find(|order| &order.order_number == order_number)
    }
}

/// A scheduled card-payment completion.
#[derive(Debug)]
pub struct PaymentTimer {
    pub(crate) id: u64,
    pub(crate) token: CancellationToken,
}

/// Everything the storefront knows about one shopper.
#[derive(Debug, Default)]
pub struct Shopper {
    pub cart: CartState,
    pub checkout: CheckoutFlow,
    pub orders: OrderHistory,
    pub(crate) payment_timer: Option<PaymentTimer>,
    pub(crate) next_timer_id: u64,
}

impl Shopper {
    /// Whether a card-payment timer is pending.
    #[must_use]
    pub const fn has_pending_payment(&self) -> bool {
        self.payment_timer.is_some()
    }

    /// Cancel the pending card-payment timer, if any.
    pub fn cancel_payment_timer(&mut self) {
        if let Some(timer) = self.payment_timer.take() {
            timer.token.cancel();
        }
    }
}

/// A shopper plus the token that bounds its lifetime.
#[derive(Debug)]
pub struct ShopperSession {
    id: ShopperId,
    state: Mutex<Shopper>,
    lifetime: CancellationToken,
}

impl ShopperSession {
    fn new(id: ShopperId, lifetime: CancellationToken) -> Self {
        Self {
            id,
            state: Mutex::new(Shopper::default()),
            lifetime,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ShopperId {
        self.id
    }

    /// Lock the shopper state. Do not hold the guard across I/O.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Shopper> {
        self.state.lock().await
    }

    /// Cancelled when the session ends or the server shuts down.
    #[must_use]
    pub const fn lifetime(&self) -> &CancellationToken {
        &self.lifetime
    }

    /// Whether this session has ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

/// All live shoppers.
#[derive(Clone)]
pub struct ShopperStore {
    cache: Cache<ShopperId, Arc<ShopperSession>>,
    shutdown: CancellationToken,
}

impl ShopperStore {
    /// Create a store whose entries expire after `idle` without access.
    ///
    /// `shutdown` is the application shutdown token; every shopper lifetime
    /// is a child of it.
    #[must_use]
    pub fn new(idle: Duration, shutdown: CancellationToken) -> Self {
        let cache = Cache::builder()
            .time_to_idle(idle)
            .eviction_listener(
                |id: Arc<ShopperId>, session: Arc<ShopperSession>, cause: RemovalCause| {
                    tracing::debug!(shopper_id = %id, ?cause, "Shopper evicted");
                    session.lifetime.cancel();
                },
            )
            .build();

        Self { cache, shutdown }
    }

    /// Get the shopper for `id`, creating an empty one if needed.
    pub async fn get_or_create(&self, id: ShopperId) -> Arc<ShopperSession> {
        let shutdown = &self.shutdown;
        self.cache
            .get_with(id, async move {
                tracing::debug!(shopper_id = %id, "Shopper created");
                Arc::new(ShopperSession::new(id, shutdown.child_token()))
            })
            .await
    }

    /// Get the shopper for `id` if it exists.
    pub async fn get(&self, id: ShopperId) -> Option<Arc<ShopperSession>> {
        self.cache.get(&id).await
    }

    /// End a shopper's session: cancel its timers and drop its state.
    ///
    /// Returns `false` if there was no such shopper.
    pub async fn end(&self, id: ShopperId) -> bool {
        match self.cache.remove(&id).await {
            Some(session) => {
                session.lifetime.cancel();
                true
            }
            None => false,
        }
    }

    /// Approximate number of live shoppers.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Whether no shoppers are live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use sable_core::{CartAction, NewCartLine, Price, ProductId};

    use super::*;

    fn store() -> ShopperStore {
        ShopperStore::new(Duration::from_secs(60), CancellationToken::new())
    }

    fn line() -> NewCartLine {
        NewCartLine {
            id: ProductId::from("p1"),
            name: "Phone X".into(),
            price: Price::from_units(999),
            original_price: Price::from_units(1099),
            image: String::new(),
            selected_color: None,
            selected_storage: None,
        }
    }

    fn placed(number: &str) -> PlacedOrder {
        use sable_core::checkout::{AddressFields, ShippingDetails};
        use sable_core::{PaymentMethod, PricingRules};

        let mut flow = CheckoutFlow::new();
        flow.update_shipping(ShippingDetails {
            address: AddressFields {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                address: "1 Main St".into(),
                ..AddressFields::default()
            },
            email: "jane@example.com".into(),
            phone: "555".into(),
            ..ShippingDetails::default()
        });
        flow.advance().unwrap();
        flow.advance().unwrap();
        assert_eq!(flow.form().payment.method, PaymentMethod::Bank);
        flow.advance().unwrap();

        let cart = CartState::new().apply(CartAction::AddItem(line()));
        flow.place_order(
            &cart,
            &PricingRules::checkout(),
            OrderNumber::parse(number).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_shopper() {
        let store = store();
        let id = ShopperId::generate();

        let first = store.get_or_create(id).await;
        first.lock().await.cart = CartState::new().apply(CartAction::AddItem(line()));

        let second = store.get_or_create(id).await;
        assert_eq!(second.lock().await.cart.item_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_shoppers_are_isolated() {
        let store = store();
        let a = store.get_or_create(ShopperId::generate()).await;
        let b = store.get_or_create(ShopperId::generate()).await;

        a.lock().await.cart = CartState::new().apply(CartAction::AddItem(line()));
        assert!(b.lock().await.cart.is_empty());
    }

    #[tokio::test]
    async fn test_end_cancels_lifetime_and_removes_entry() {
        let store = store();
        let id = ShopperId::generate();
        let session = store.get_or_create(id).await;

        assert!(store.end(id).await);
        assert!(session.is_ended());
        assert!(store.get(id).await.is_none());
        assert!(!store.end(id).await);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_every_shopper() {
        let shutdown = CancellationToken::new();
        let store = ShopperStore::new(Duration::from_secs(60), shutdown.clone());
        let a = store.get_or_create(ShopperId::generate()).await;
        let b = store.get_or_create(ShopperId::generate()).await;

        shutdown.cancel();
        assert!(a.is_ended());
        assert!(b.is_ended());
    }

    #[test]
    fn test_order_history_records_both_slots() {
        let mut history = OrderHistory::default();
        history.record(placed("SO-2026-AAAAAA"));
        history.record(placed("SO-2026-BBBBBB"));

        assert_eq!(history.all_orders.len(), 2);
        assert_eq!(
            history.current_order.as_ref().unwrap().order_number.as_str(),
            "SO-2026-BBBBBB"
        );
        let first = OrderNumber::parse("SO-2026-AAAAAA").unwrap();
        assert!(history.find(&first).is_some());
        let missing = OrderNumber::parse("SO-2026-ZZZZZZ").unwrap();
        assert!(history.find(&missing).is_none());
    }
}
