//! Database-backed API and health routes.
//!
//! The database is unreachable here, so these tests cover what happens
//! before and instead of a successful query.

use axum::http::{Method, StatusCode};
use sable_integration_tests::TestApp;
use serde_json::{Value, json};

fn submission(email: &str, items: Value) -> Value {
    json!({
        "email": email,
        "phone": "555-0100",
        "shipping_address": {
            "first_name": "Jane",
            "last_name": "Doe",
            "address": "1 Main St",
            "city": "Springfield",
            "postal_code": "12345",
        },
        "shipping_method": "express",
        "payment_method": "bank",
        "items": items,
    })
}

#[tokio::test]
async fn test_health() {
    let mut app = TestApp::new();

    let res = app.get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!("ok"));
    assert!(res.headers.contains_key("x-request-id"));
    assert_eq!(
        res.headers.get("x-content-type-options").and_then(|v| v.to_str().ok()),
        Some("nosniff")
    );
}

fn request_id(res: &sable_integration_tests::TestResponse) -> &str {
    res.headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header")
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let mut app = TestApp::new();

    let res = app
        .request_with_headers(Method::GET, "/cart", None, &[("x-request-id", "edge-42.fra")])
        .await;
    assert_eq!(request_id(&res), "edge-42.fra");

    // Ids that are not safe to log are replaced
    let res = app
        .request_with_headers(Method::GET, "/cart", None, &[("x-request-id", "a b <script>")])
        .await;
    let generated = request_id(&res);
    assert_ne!(generated, "a b <script>");
    assert_eq!(generated.len(), 36);

    let first = app.get("/health").await;
    let second = app.get("/health").await;
    assert_ne!(request_id(&first), request_id(&second));
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let mut app = TestApp::new();
    assert_eq!(
        app.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_order_rejects_invalid_email() {
    let mut app = TestApp::new();

    let res = app
        .post(
            "/api/orders",
            Some(submission("not-an-email", json!([{ "product_id": "p1", "quantity": 1 }]))),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn test_order_rejects_empty_items() {
    let mut app = TestApp::new();

    let res = app
        .post("/api/orders", Some(submission("jane@example.com", json!([]))))
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_order_rejects_zero_quantity() {
    let mut app = TestApp::new();

    let res = app
        .post(
            "/api/orders",
            Some(submission(
                "jane@example.com",
                json!([{ "product_id": "p1", "quantity": 0 }]),
            )),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_database_failure_hides_details() {
    let mut app = TestApp::new();

    let res = app.get("/api/products").await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.body, json!({ "error": "Catalog unavailable" }));
}

#[tokio::test]
async fn test_persisted_order_lookup_validates_number() {
    let mut app = TestApp::new();

    let res = app.get("/api/orders/bogus").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
