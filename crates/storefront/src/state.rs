//! Application state shared across handlers.

use std::sync::Arc;

use sable_core::PricingRules;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::StorefrontConfig;
use crate::services::{CardPaymentSimulator, CatalogService, ShopperStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    shoppers: ShopperStore,
    catalog: CatalogService,
    payments: CardPaymentSimulator,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `shutdown` - Cancelled on graceful shutdown; stops every shopper timer
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, shutdown: CancellationToken) -> Self {
        let shoppers = ShopperStore::new(config.session_idle, shutdown.clone());
        let catalog = CatalogService::new(pool.clone(), config.catalog_cache_ttl);
        let payments = CardPaymentSimulator::new(config.card_processing_delay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shoppers,
                catalog,
                payments,
                shutdown,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Live shopper state.
    #[must_use]
    pub fn shoppers(&self) -> &ShopperStore {
        &self.inner.shoppers
    }

    /// Cached catalog reads.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn payments(&self) -> &CardPaymentSimulator {
        &self.inner.payments
    }

    /// Application shutdown token.
    #[must_use]
    pub fn shutdown(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// Rules for the checkout page and persisted orders.
    #[must_use]
    pub fn checkout_rules(&self) -> PricingRules {
        self.inner.config.checkout_rules()
    }

    /// Rules for the cart summary.
    #[must_use]
    pub fn cart_rules(&self) -> PricingRules {
        self.inner.config.cart_rules()
    }
}
