//! Cached catalog reads.
//!
//! Products and the bank-transfer account change rarely, so reads go through
//! a `moka` cache with a configurable TTL. Only successful lookups are
//! cached: errors and misses always hit the database again.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sable_core::ProductId;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::db::{BankDetailsRepository, ProductRepository, RepositoryError};
use crate::models::{BankDetails, Product};

/// Errors from catalog reads.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Product(ProductId),
    BankDetails,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    BankDetails(Box<BankDetails>),
}

/// Read-through cache in front of the product and bank-details tables.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service whose entries live for `ttl`.
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.inner.pool).list().await?);

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// A single product, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let Some(product) = ProductRepository::new(&self.inner.pool).get(id).await? else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// The active bank-transfer account, or `None` if none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    #[instrument(skip(self))]
    pub async fn bank_details(&self) -> Result<Option<BankDetails>, CatalogError> {
        if let Some(CacheValue::BankDetails(details)) =
            self.inner.cache.get(&CacheKey::BankDetails).await
        {
            debug!("Cache hit for bank details");
            return Ok(Some(*details));
        }

        let Some(details) = BankDetailsRepository::new(&self.inner.pool)
            .get_active()
            .await?
        else {
            return Ok(None);
        };

        self.inner
            .cache
            .insert(
                CacheKey::BankDetails,
                CacheValue::BankDetails(Box::new(details.clone())),
            )
            .await;

        Ok(Some(details))
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
