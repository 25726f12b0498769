//! Order API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sable_core::OrderNumber;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::StoredOrder;
use crate::services::{OrderService, OrderSubmission};
use crate::state::AppState;

/// Price, stock-check and persist an order.
///
/// Returns `201 Created` with the order id, number and the totals the
/// server computed.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(submission): Json<OrderSubmission>,
) -> Result<impl IntoResponse> {
    let receipt = OrderService::new(state.pool(), state.checkout_rules())
        .submit(submission, Utc::now())
        .await?;

    // Stock changed
    state.catalog().invalidate_all().await;

    add_breadcrumb(
        "orders",
        "Order submitted",
        Some(&[("order_number", receipt.order_number.as_str())]),
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Look up a persisted order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<StoredOrder>> {
    let number = OrderNumber::parse(&number).map_err(|e| AppError::BadRequest(e.to_string()))?;

    OrderRepository::new(state.pool())
        .get_by_number(&number)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {number}")))
}
