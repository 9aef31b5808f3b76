//! End-to-end tests for change requests and their effect on estimates.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn order_with_estimate(app: &TestApp) -> (String, i64, i64) {
    let service = app.seed_service("Full Custom Build", 500_000, 30).await;
    let high = app.seed_complexity("High", "high", dec!(1.5)).await;

    let body = response_json(
        app.client(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{
                    "kit_name": "RX-78-2",
                    "service_id": service.id,
                    "complexity_id": high.id
                }]
            })),
        )
        .await,
    )
    .await;
    let order = &body["data"];
    (
        order["id"].as_str().expect("order id").to_string(),
        order["estimated_price_cents"].as_i64().expect("price"),
        order["estimated_days"].as_i64().expect("days"),
    )
}

async fn get_order(app: &TestApp, order_id: &str) -> Value {
    response_json(
        app.admin(Method::GET, &format!("/api/v1/orders/{}", order_id), None)
            .await,
    )
    .await
}

#[tokio::test]
async fn clients_can_raise_change_requests() {
    let app = TestApp::new().await;
    let (order_id, _, _) = order_with_estimate(&app).await;

    let response = app
        .client(
            Method::POST,
            &format!("/api/v1/orders/{}/change-requests", order_id),
            Some(json!({
                "description": "Add LED unit to the head",
                "price_impact_cents": 50_000,
                "day_impact": 3
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn approval_applies_the_impacts_atomically() {
    let app = TestApp::new().await;
    let (order_id, price, days) = order_with_estimate(&app).await;

    let body = response_json(
        app.client(
            Method::POST,
            &format!("/api/v1/orders/{}/change-requests", order_id),
            Some(json!({
                "description": "Add LED unit",
                "price_impact_cents": 50_000,
                "day_impact": 3
            })),
        )
        .await,
    )
    .await;
    let cr_id = body["data"]["id"].as_str().expect("cr id").to_string();

    // Clients cannot decide their own requests.
    let response = app
        .client(
            Method::POST,
            &format!("/api/v1/change-requests/{}/approve", cr_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/change-requests/{}/approve", cr_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "approved");
    assert!(body["data"]["decided_at"].is_string());

    let order = get_order(&app, &order_id).await;
    assert_eq!(
        order["data"]["estimated_price_cents"].as_i64(),
        Some(price + 50_000)
    );
    assert_eq!(order["data"]["estimated_days"].as_i64(), Some(days + 3));
    assert_eq!(order["data"]["version"], 2);
}

#[tokio::test]
async fn decisions_are_final() {
    let app = TestApp::new().await;
    let (order_id, _, _) = order_with_estimate(&app).await;

    let body = response_json(
        app.client(
            Method::POST,
            &format!("/api/v1/orders/{}/change-requests", order_id),
            Some(json!({ "description": "Swap decals", "price_impact_cents": 10_000 })),
        )
        .await,
    )
    .await;
    let cr_id = body["data"]["id"].as_str().expect("cr id").to_string();

    let first = app
        .admin(
            Method::POST,
            &format!("/api/v1/change-requests/{}/approve", cr_id),
            None,
        )
        .await;
    assert_eq!(first.status(), 200);

    // Approving or rejecting again conflicts.
    let again = app
        .admin(
            Method::POST,
            &format!("/api/v1/change-requests/{}/approve", cr_id),
            None,
        )
        .await;
    assert_eq!(again.status(), 409);
    let reject = app
        .admin(
            Method::POST,
            &format!("/api/v1/change-requests/{}/reject", cr_id),
            None,
        )
        .await;
    assert_eq!(reject.status(), 409);
}

#[tokio::test]
async fn rejection_leaves_the_estimate_untouched() {
    let app = TestApp::new().await;
    let (order_id, price, days) = order_with_estimate(&app).await;

    let body = response_json(
        app.client(
            Method::POST,
            &format!("/api/v1/orders/{}/change-requests", order_id),
            Some(json!({ "description": "Gold plating", "price_impact_cents": 900_000, "day_impact": 20 })),
        )
        .await,
    )
    .await;
    let cr_id = body["data"]["id"].as_str().expect("cr id").to_string();

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/change-requests/{}/reject", cr_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let order = get_order(&app, &order_id).await;
    assert_eq!(order["data"]["estimated_price_cents"].as_i64(), Some(price));
    assert_eq!(order["data"]["estimated_days"].as_i64(), Some(days));
    assert_eq!(order["data"]["version"], 1);
}

#[tokio::test]
async fn negative_estimates_cannot_be_approved() {
    let app = TestApp::new().await;
    let (order_id, price, _) = order_with_estimate(&app).await;

    let body = response_json(
        app.client(
            Method::POST,
            &format!("/api/v1/orders/{}/change-requests", order_id),
            Some(json!({
                "description": "Refund more than the build",
                "price_impact_cents": -(price + 1)
            })),
        )
        .await,
    )
    .await;
    let cr_id = body["data"]["id"].as_str().expect("cr id").to_string();

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/change-requests/{}/approve", cr_id),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);

    // And the order is unchanged.
    let order = get_order(&app, &order_id).await;
    assert_eq!(order["data"]["estimated_price_cents"].as_i64(), Some(price));
}

#[tokio::test]
async fn closed_orders_do_not_accept_change_requests() {
    let app = TestApp::new().await;
    let (order_id, _, _) = order_with_estimate(&app).await;

    app.client(
        Method::POST,
        &format!("/api/v1/orders/{}/cancel", order_id),
        Some(json!({})),
    )
    .await;

    let response = app
        .client(
            Method::POST,
            &format!("/api/v1/orders/{}/change-requests", order_id),
            Some(json!({ "description": "Too late" })),
        )
        .await;
    assert_eq!(response.status(), 400);
}
