//! Checkout wizard route handlers.
//!
//! The wizard state lives with the shopper; these handlers only translate
//! HTTP into [`CheckoutFlow`] calls. A card payment is simulated: advancing
//! from the payment step with a card answers `202 Accepted` and the outcome
//! shows up on a later `GET /checkout`.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use chrono::{Datelike, Utc};
use sable_core::checkout::{BillingDetails, PaymentDetails, ShippingDetails};
use sable_core::{
    Advance, CartAction, CartLine, CheckoutFlow, OrderNumber, OrderTotals, PlacedOrder,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::models::BankDetails;
use crate::services::Shopper;
use crate::state::AppState;

/// Wizard snapshot returned by every checkout route.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    #[serde(flatten)]
    pub flow: CheckoutFlow,
    pub step_number: u8,
    pub step_title: &'static str,
    pub items: Vec<CartLine>,
    pub totals: OrderTotals,
}

impl CheckoutView {
    fn new(shopper: &Shopper, state: &AppState) -> Self {
        let step = shopper.checkout.step();
        Self {
            flow: shopper.checkout.clone(),
            step_number: step.index(),
            step_title: step.title(),
            items: shopper.cart.items().to_vec(),
            totals: shopper.checkout.totals(&shopper.cart, &state.checkout_rules()),
        }
    }
}

/// Body of `GET /checkout`.
///
/// Bank details are informational: when they cannot be loaded the page
/// still renders with `bank_details_error` set.
#[derive(Debug, Serialize)]
pub struct CheckoutPage {
    #[serde(flatten)]
    pub checkout: CheckoutView,
    pub bank_details: Option<BankDetails>,
    pub bank_details_error: Option<String>,
}

/// Body of `POST /checkout/next`.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub advance: Advance,
    pub checkout: CheckoutView,
}

/// Body of `POST /checkout/place-order`.
#[derive(Debug, Serialize)]
pub struct PlacedOrderResponse {
    pub order: PlacedOrder,
    pub tracking_url: String,
}

/// Show the wizard, including bank-transfer details.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CheckoutPage> {
    // Load before locking the shopper
    let (bank_details, bank_details_error) = match state.catalog().bank_details().await {
        Ok(Some(details)) => (Some(details), None),
        Ok(None) => (None, Some("Bank details are not available".to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load bank details");
            (None, Some("Could not load bank details".to_string()))
        }
    };

    let shopper = shopper.lock().await;
    Json(CheckoutPage {
        checkout: CheckoutView::new(&shopper, &state),
        bank_details,
        bank_details_error,
    })
}

/// Replace the shipping details.
#[instrument(skip_all)]
pub async fn update_shipping(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(details): Json<ShippingDetails>,
) -> Json<CheckoutView> {
    let mut shopper = shopper.lock().await;
    shopper.checkout.update_shipping(details);
    Json(CheckoutView::new(&shopper, &state))
}

/// Replace the billing details.
#[instrument(skip_all)]
pub async fn update_billing(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(details): Json<BillingDetails>,
) -> Json<CheckoutView> {
    let mut shopper = shopper.lock().await;
    shopper.checkout.update_billing(details);
    Json(CheckoutView::new(&shopper, &state))
}

/// Choose the payment method and card fields.
#[instrument(skip_all, fields(method = %details.method))]
pub async fn update_payment(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(details): Json<PaymentDetails>,
) -> Result<Json<CheckoutView>> {
    let mut shopper = shopper.lock().await;
    shopper.checkout.update_payment(details)?;
    Ok(Json(CheckoutView::new(&shopper, &state)))
}

/// Move to the next step.
///
/// Returns `202 Accepted` when a card payment starts processing instead of
/// moving.
#[instrument(skip_all)]
pub async fn next(
    State(state): State<AppState>,
    CurrentShopper(session): CurrentShopper,
) -> Result<impl IntoResponse> {
    let mut shopper = session.lock().await;
    let advance = shopper.checkout.advance()?;

    let status = match advance {
        Advance::Moved(step) => {
            add_breadcrumb("checkout", "Advanced", Some(&[("step", step.title())]));
            StatusCode::OK
        }
        Advance::CardProcessingStarted => {
            state.payments().start(&session, &mut shopper);
            tracing::info!(
                delay_secs = state.payments().delay().as_secs(),
                "Card payment processing"
            );
            StatusCode::ACCEPTED
        }
    };

    Ok((
        status,
        Json(AdvanceResponse {
            advance,
            checkout: CheckoutView::new(&shopper, &state),
        }),
    ))
}

/// Move to the previous step.
#[instrument(skip_all)]
pub async fn back(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Result<Json<CheckoutView>> {
    let mut shopper = shopper.lock().await;
    shopper.checkout.back()?;
    Ok(Json(CheckoutView::new(&shopper, &state)))
}

/// Close the failed-payment notice. Refused while a card is processing.
#[instrument(skip_all)]
pub async fn dismiss_payment_failure(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Result<Json<CheckoutView>> {
    let mut shopper = shopper.lock().await;
    shopper.checkout.dismiss_payment_failure()?;
    Ok(Json(CheckoutView::new(&shopper, &state)))
}

/// Place the order from the review step.
///
/// The order is kept in the session's history only; nothing is written to
/// the database. The cart is emptied and the wizard starts over.
#[instrument(skip_all, fields(order_number))]
pub async fn place_order(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Result<impl IntoResponse> {
    let now = Utc::now();
    let order_number = OrderNumber::generate(now.year(), &mut rand::rng());
    tracing::Span::current().record("order_number", order_number.as_str());

    let mut shopper = shopper.lock().await;
    let order = shopper.checkout.place_order(
        &shopper.cart,
        &state.checkout_rules(),
        order_number,
        now,
    )?;

    shopper.orders.record(order.clone());
    let cleared = shopper.cart.apply(CartAction::Clear);
    shopper.cart = cleared;
    shopper.checkout.reset();
    shopper.cancel_payment_timer();
    drop(shopper);

    tracing::info!(
        total = %order.totals.total,
        items = order.item_count(),
        "Order placed"
    );
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", order.order_number.as_str())]),
    );

    let tracking_url = format!("/orders/{}", order.order_number);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, tracking_url.clone())],
        Json(PlacedOrderResponse {
            order,
            tracking_url,
        }),
    ))
}
