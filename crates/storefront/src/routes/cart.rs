//! Cart route handlers.
//!
//! Every handler applies one or more [`CartAction`]s to the current
//! shopper's cart and answers with the resulting [`CartView`].

use axum::{
    Json,
    extract::{Path, State},
};
use sable_core::{
    CartAction, CartLine, CartState, CartTotals, LineKey, NewCartLine, PricingRules, ProductId,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::services::ShopperSession;
use crate::state::AppState;

/// Cart snapshot returned by every cart route.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub is_open: bool,
    pub totals: CartTotals,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &CartState, rules: &PricingRules) -> Self {
        Self {
            items: cart.items().to_vec(),
            is_open: cart.is_open(),
            totals: cart.totals(rules),
        }
    }
}

/// Body of `PATCH /cart/items/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Apply `actions` in order and return the new cart.
async fn dispatch(
    shopper: &ShopperSession,
    rules: &PricingRules,
    actions: impl IntoIterator<Item = CartAction>,
) -> CartView {
    let mut state = shopper.lock().await;
    let next = actions
        .into_iter()
        .fold(state.cart.clone(), |cart, action| cart.apply(action));
    let view = CartView::new(&next, rules);
    state.cart = next;
    view
}

/// Show the cart.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CartView> {
    let shopper = shopper.lock().await;
    Json(CartView::new(&shopper.cart, &state.cart_rules()))
}

/// Add one unit of a product variant and open the cart panel.
///
/// The line carries the name and prices the client was shown; the catalog
/// is only consulted when an order is submitted through `/api/orders`.
/// Prices outside the accepted range are rejected with 422.
#[instrument(skip_all, fields(product_id = %line.id))]
pub async fn add(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(line): Json<NewCartLine>,
) -> Result<Json<CartView>> {
    line.validate().map_err(|err| AppError::Validation(err.to_string()))?;

    add_breadcrumb("cart", "Added item", Some(&[("product_id", line.id.as_str())]));

    let view = dispatch(
        &shopper,
        &state.cart_rules(),
        [CartAction::AddItem(line), CartAction::OpenCart],
    )
    .await;

    Ok(Json(view))
}

/// Set the quantity of every line for a product. Zero or less removes them.
#[instrument(skip_all, fields(product_id = %id, quantity = body.quantity))]
pub async fn update_quantity(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Json<CartView> {
    let action = CartAction::UpdateQuantity {
        id,
        quantity: body.quantity,
    };
    Json(dispatch(&shopper, &state.cart_rules(), [action]).await)
}

/// Remove every line for a product, whatever the variant.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Path(id): Path<ProductId>,
) -> Json<CartView> {
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
    Json(dispatch(&shopper, &state.cart_rules(), [CartAction::RemoveItem { id }]).await)
}

/// Remove exactly one variant line.
#[instrument(skip_all, fields(product_id = %key.id))]
pub async fn remove_line(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
    Json(key): Json<LineKey>,
) -> Json<CartView> {
    Json(dispatch(&shopper, &state.cart_rules(), [CartAction::RemoveLine(key)]).await)
}

#[instrument(skip_all)]
pub async fn open(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CartView> {
    Json(dispatch(&shopper, &state.cart_rules(), [CartAction::OpenCart]).await)
}

#[instrument(skip_all)]
pub async fn close(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CartView> {
    Json(dispatch(&shopper, &state.cart_rules(), [CartAction::CloseCart]).await)
}

#[instrument(skip_all)]
pub async fn toggle(
    State(state): State<AppState>,
    CurrentShopper(shopper): CurrentShopper,
) -> Json<CartView> {
    Json(dispatch(&shopper, &state.cart_rules(), [CartAction::ToggleCart]).await)
}
