//! Session order history and session teardown.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sable_core::{OrderNumber, PlacedOrder};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{CurrentShopper, end_shopper_session};
use crate::state::AppState;

/// Every order placed this session, oldest first.
#[instrument(skip_all)]
pub async fn index(CurrentShopper(shopper): CurrentShopper) -> Json<Vec<PlacedOrder>> {
    Json(shopper.lock().await.orders.all_orders.clone())
}

/// The order shown on the confirmation page.
#[instrument(skip_all)]
pub async fn current(CurrentShopper(shopper): CurrentShopper) -> Result<Json<PlacedOrder>> {
    shopper
        .lock()
        .await
        .orders
        .current_order
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no order placed this session".to_string()))
}

/// Track an order placed this session.
#[instrument(skip_all, fields(order_number = %number))]
pub async fn show(
    CurrentShopper(shopper): CurrentShopper,
    Path(number): Path<String>,
) -> Result<Json<PlacedOrder>> {
    let number = OrderNumber::parse(&number).map_err(|e| AppError::BadRequest(e.to_string()))?;

    shopper
        .lock()
        .await
        .orders
        .find(&number)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {number}")))
}

/// End the session: cancel pending payments and forget the shopper.
#[instrument(skip_all)]
pub async fn end_session(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    if end_shopper_session(&session, &state).await? {
        tracing::info!("Shopper session ended");
    }
    Ok(StatusCode::NO_CONTENT)
}
