//! Cart routes: adding, updating and removing lines through the session.

use axum::http::StatusCode;
use sable_integration_tests::{TestApp, phone};
use serde_json::json;

#[tokio::test]
async fn test_new_shopper_has_empty_closed_cart() {
    let mut app = TestApp::new();

    let res = app.get("/cart").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"], json!([]));
    assert_eq!(res.body["is_open"], json!(false));
    assert_eq!(res.body["totals"]["item_count"], json!(0));
}

#[tokio::test]
async fn test_adding_same_variant_twice_merges_lines() {
    let mut app = TestApp::new();

    app.post("/cart/items", Some(phone("Black", "256GB"))).await;
    let res = app.post("/cart/items", Some(phone("Black", "256GB"))).await;

    assert_eq!(res.status, StatusCode::OK);
    let items = res.body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], json!(2));
    assert_eq!(res.body["is_open"], json!(true));
    assert_eq!(res.body["totals"]["subtotal"], json!("1998"));
    assert_eq!(res.body["totals"]["savings"], json!("200"));
    assert_eq!(res.body["totals"]["item_count"], json!(2));
}

#[tokio::test]
async fn test_cart_survives_across_requests_in_session() {
    let mut app = TestApp::new();
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;

    let res = app.get("/cart").await;
    assert_eq!(res.body["totals"]["item_count"], json!(1));

    // A different browser sees its own cart
    app.clear_cookies();
    let res = app.get("/cart").await;
    assert_eq!(res.body["totals"]["item_count"], json!(0));
}

#[tokio::test]
async fn test_remove_item_drops_every_variant() {
    let mut app = TestApp::new();
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;
    app.post("/cart/items", Some(phone("Silver", "128GB"))).await;

    let res = app.delete("/cart/items/p1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"], json!([]));
}

#[tokio::test]
async fn test_remove_line_drops_one_variant() {
    let mut app = TestApp::new();
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;
    app.post("/cart/items", Some(phone("Silver", "128GB"))).await;

    let res = app
        .post(
            "/cart/lines/remove",
            Some(json!({
                "id": "p1",
                "selected_color": "Black",
                "selected_storage": "256GB",
            })),
        )
        .await;

    let items = res.body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["selected_color"], json!("Silver"));
}

#[tokio::test]
async fn test_quantity_zero_removes_line() {
    let mut app = TestApp::new();
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;

    let res = app.patch("/cart/items/p1", json!({ "quantity": 5 })).await;
    assert_eq!(res.body["items"][0]["quantity"], json!(5));

    let res = app.patch("/cart/items/p1", json!({ "quantity": 0 })).await;
    assert_eq!(res.body["items"], json!([]));
}

#[tokio::test]
async fn test_panel_open_close_toggle() {
    let mut app = TestApp::new();

    assert_eq!(app.post("/cart/open", None).await.body["is_open"], json!(true));
    assert_eq!(app.post("/cart/close", None).await.body["is_open"], json!(false));
    assert_eq!(app.post("/cart/toggle", None).await.body["is_open"], json!(true));
    assert_eq!(app.post("/cart/toggle", None).await.body["is_open"], json!(false));
}

#[tokio::test]
async fn test_malformed_line_is_rejected() {
    let mut app = TestApp::new();

    let res = app.post("/cart/items", Some(json!({ "id": "p1" }))).await;
    assert!(res.status.is_client_error());
}

#[tokio::test]
async fn test_out_of_range_price_is_rejected_and_cart_stays_usable() {
    let mut app = TestApp::new();
    app.post("/cart/items", Some(phone("Black", "256GB"))).await;

    let mut huge = phone("Black", "512GB");
    huge["price"] = json!("50000000000000000000000000000");
    huge["original_price"] = json!("50000000000000000000000000000");

    for _ in 0..2 {
        let res = app.post("/cart/items", Some(huge.clone())).await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.body["error"], json!("price must be between 0 and 1000000000"));
    }

    let mut negative = phone("Black", "512GB");
    negative["price"] = json!("-1");
    let res = app.post("/cart/items", Some(negative)).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let res = app.get("/cart").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["totals"]["item_count"], json!(1));
    assert_eq!(res.body["totals"]["subtotal"], json!("999"));

    let res = app.get("/checkout").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_huge_quantity_keeps_totals_exact() {
    let mut app = TestApp::new();
    let mut line = phone("Black", "256GB");
    line["price"] = json!("1000000000");
    line["original_price"] = json!("1000000000");
    app.post("/cart/items", Some(line)).await;

    let res = app.patch("/cart/items/p1", json!({ "quantity": i64::MAX })).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"][0]["quantity"], json!(u32::MAX));
    assert_eq!(res.body["totals"]["subtotal"], json!("4294967295000000000"));
}
