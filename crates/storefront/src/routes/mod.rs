//! HTTP route handlers for storefront.
//!
//! Every route speaks JSON.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness
//! GET    /health/ready            - Database readiness
//!
//! # Cart (session)
//! GET    /cart                    - Cart items, panel state and totals
//! POST   /cart/items              - Add one unit of a variant, open the panel
//! PATCH  /cart/items/{id}         - Set quantity for every line of a product
//! DELETE /cart/items/{id}         - Remove every line of a product
//! POST   /cart/lines/remove       - Remove one variant line
//! POST   /cart/open               - Open the cart panel
//! POST   /cart/close              - Close the cart panel
//! POST   /cart/toggle             - Toggle the cart panel
//!
//! # Checkout (session)
//! GET    /checkout                - Wizard snapshot with bank details
//! PUT    /checkout/shipping       - Replace shipping details
//! PUT    /checkout/billing        - Replace billing details
//! PUT    /checkout/payment        - Choose payment method
//! POST   /checkout/next           - Next step (202 while a card processes)
//! POST   /checkout/back           - Previous step
//! POST   /checkout/payment-failure/dismiss - Close the failed-payment notice
//! POST   /checkout/place-order    - Place the order (201)
//!
//! # Orders (session)
//! GET    /orders                  - Orders placed this session
//! GET    /orders/current          - Most recent order
//! GET    /orders/{number}         - Track an order
//! DELETE /session                 - End the session
//!
//! # API (database)
//! GET    /api/products            - Product catalog
//! GET    /api/products/{id}       - Product detail
//! GET    /api/bank-details        - Active bank-transfer account
//! POST   /api/orders              - Submit an order (201)
//! GET    /api/orders/{number}     - Persisted order
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route(
            "/items/{id}",
            patch(cart::update_quantity).delete(cart::remove_item),
        )
        .route("/lines/remove", post(cart::remove_line))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
        .route("/toggle", post(cart::toggle))
}

/// Create the checkout routes router.
///
/// Mutations are rate limited; the snapshot is not.
pub fn checkout_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/shipping", put(checkout::update_shipping))
        .route("/billing", put(checkout::update_billing))
        .route("/payment", put(checkout::update_payment))
        .route("/next", post(checkout::next))
        .route("/back", post(checkout::back))
        .route(
            "/payment-failure/dismiss",
            post(checkout::dismiss_payment_failure),
        )
        .route("/place-order", post(checkout::place_order))
        .layer(checkout_rate_limiter());

    Router::new()
        .route("/", get(checkout::show))
        .merge(mutations)
}

/// Create the session order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/current", get(orders::current))
        .route("/{number}", get(orders::show))
}

/// Create the database-backed API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::catalog::list_products))
        .route("/products/{id}", get(api::catalog::show_product))
        .route("/bank-details", get(api::catalog::bank_details))
        .route("/orders", post(api::orders::create))
        .route("/orders/{number}", get(api::orders::show))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/orders", order_routes())
        .route("/session", delete(orders::end_session))
        .nest("/api", api_routes())
}
