//! End-to-end tests for the append-only progress trail.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

async fn order_with_item(app: &TestApp) -> (String, String) {
    let service = app.seed_service("Straight Build", 100_000, 7).await;
    let low = app.seed_complexity("Low", "low", dec!(1.0)).await;

    let body = response_json(
        app.client(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{
                    "kit_name": "Zaku II",
                    "service_id": service.id,
                    "complexity_id": low.id
                }]
            })),
        )
        .await,
    )
    .await;
    let order_id = body["data"]["id"].as_str().expect("order id").to_string();

    let items = response_json(
        app.client(Method::GET, &format!("/api/v1/orders/{}/items", order_id), None)
            .await,
    )
    .await;
    let item_id = items["data"][0]["id"].as_str().expect("item id").to_string();
    (order_id, item_id)
}

#[tokio::test]
async fn studio_logs_progress_and_owner_reads_it() {
    let app = TestApp::new().await;
    let (order_id, item_id) = order_with_item(&app).await;

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", order_id),
            Some(json!({
                "message": "Primed the torso",
                "order_item_id": item_id,
                "photo_url": "https://storage.example.com/progress/torso.jpg"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", order_id),
            Some(json!({ "message": "Base coat done" })),
        )
        .await;
    assert_eq!(response.status(), 201);

    // The owning client reads the trail in order.
    let body = response_json(
        app.client(Method::GET, &format!("/api/v1/orders/{}/progress", order_id), None)
            .await,
    )
    .await;
    let logs = body["data"].as_array().expect("logs");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["message"], "Primed the torso");
    assert_eq!(
        logs[0]["photo_url"],
        "https://storage.example.com/progress/torso.jpg"
    );
    assert_eq!(logs[1]["message"], "Base coat done");
}

#[tokio::test]
async fn clients_cannot_write_progress() {
    let app = TestApp::new().await;
    let (order_id, _) = order_with_item(&app).await;

    let response = app
        .client(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", order_id),
            Some(json!({ "message": "I did it myself" })),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn item_references_must_belong_to_the_order() {
    let app = TestApp::new().await;
    let (order_id, _) = order_with_item(&app).await;

    // Unknown item id.
    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", order_id),
            Some(json!({ "message": "Wrong kit", "order_item_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(response.status(), 404);

    // Item from a different order.
    let other_service = app.seed_service("Repair", 50_000, 3).await;
    let other_low = app.seed_complexity("Trivial", "trivial", dec!(1.0)).await;
    let body = response_json(
        app.client(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{
                    "kit_name": "Gouf",
                    "service_id": other_service.id,
                    "complexity_id": other_low.id
                }]
            })),
        )
        .await,
    )
    .await;
    let other_order_id = body["data"]["id"].as_str().expect("order id").to_string();
    let items = response_json(
        app.client(
            Method::GET,
            &format!("/api/v1/orders/{}/items", other_order_id),
            None,
        )
        .await,
    )
    .await;
    let foreign_item = items["data"][0]["id"].as_str().expect("item id");

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", order_id),
            Some(json!({ "message": "Wrong kit", "order_item_id": foreign_item })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn invalid_photo_urls_are_rejected() {
    let app = TestApp::new().await;
    let (order_id, _) = order_with_item(&app).await;

    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", order_id),
            Some(json!({ "message": "Photo attached", "photo_url": "not a url" })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn progress_for_unknown_orders_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .admin(
            Method::POST,
            &format!("/api/v1/orders/{}/progress", Uuid::new_v4()),
            Some(json!({ "message": "ghost" })),
        )
        .await;
    assert_eq!(response.status(), 404);
}
