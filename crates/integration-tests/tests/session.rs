//! Session lifecycle.

use std::time::Duration;

use axum::http::StatusCode;
use sable_integration_tests::{TestApp, phone, valid_shipping};
use serde_json::json;

#[tokio::test]
async fn test_ending_session_drops_shopper_state() {
    let mut app = TestApp::new();
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;
    assert_eq!(app.state.shoppers().len().await, 1);

    let res = app.delete("/session").await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(app.state.shoppers().is_empty().await);

    // The next request starts over
    let res = app.get("/cart").await;
    assert_eq!(res.body["items"], json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_ending_session_cancels_card_timer() {
    let mut app = TestApp::with_card_delay(Duration::from_secs(10));
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;
    app.put("/checkout/shipping", valid_shipping()).await;
    app.post("/checkout/next", None).await;
    app.post("/checkout/next", None).await;
    app.put("/checkout/payment", json!({ "method": "card" })).await;
    assert_eq!(app.post("/checkout/next", None).await.status, StatusCode::ACCEPTED);

    app.delete("/session").await;
    assert!(app.state.shoppers().is_empty().await);

    tokio::time::sleep(Duration::from_secs(11)).await;

    // New session, untouched by the old timer
    let res = app.get("/checkout").await;
    assert_eq!(res.body["payment_failed"], json!(false));
    assert_eq!(res.body["step"], json!("shipping"));
}

#[tokio::test]
async fn test_ending_session_without_shopper_is_fine() {
    let mut app = TestApp::new();
    assert_eq!(app.delete("/session").await.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_unknown_session_order_is_not_found() {
    let mut app = TestApp::new();

    assert_eq!(app.get("/orders/current").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get("/orders/SO-2026-ABC123").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.get("/orders/not-a-number").await.status, StatusCode::BAD_REQUEST);
}
