//! Product repository.
//!
//! Queries are checked at runtime with `query_as` so the workspace builds
//! without a live database or offline query data.

use sable_core::{Price, ProductId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, stock, \
                               image_url, colors, storage_options";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    original_price: Price,
    stock: i32,
    image_url: String,
    colors: Vec<String>,
    storage_options: Vec<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative stock {} for product {}",
                row.stock, row.id
            ))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            stock,
            image_url: row.image_url,
            colors: row.colors,
            storage_options: row.storage_options,
        })
    }
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Get every product whose ID is in `ids`. Unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<&str> = ids.iter().map(ProductId::as_str).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Insert or replace a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::OutOfRange` if the stock does not fit the
    /// column, `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        let stock = i32::try_from(product.stock).map_err(|_| {
            RepositoryError::OutOfRange(format!("stock too large for {}", product.id))
        })?;

        sqlx::query(
            r"
            INSERT INTO storefront.product (
                id, name, description, price, original_price, stock,
                image_url, colors, storage_options
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                original_price = EXCLUDED.original_price,
                stock = EXCLUDED.stock,
                image_url = EXCLUDED.image_url,
                colors = EXCLUDED.colors,
                storage_options = EXCLUDED.storage_options,
                updated_at = NOW()
            ",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(stock)
        .bind(&product.image_url)
        .bind(&product.colors)
        .bind(&product.storage_options)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete every product. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
