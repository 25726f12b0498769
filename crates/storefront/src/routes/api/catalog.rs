//! Catalog API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use sable_core::ProductId;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{BankDetails, Product};
use crate::state::AppState;

/// All products.
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list_products().await?;
    Ok(Json(products.to_vec()))
}

/// A single product.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .get_product(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// The active bank-transfer account.
#[instrument(skip(state))]
pub async fn bank_details(State(state): State<AppState>) -> Result<Json<BankDetails>> {
    state
        .catalog()
        .bank_details()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("bank details".to_string()))
}
