//! End-to-end tests for catalog administration and role gating.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn status_and_health_are_open() {
    let app = TestApp::new().await;
    assert_eq!(
        app.request(Method::GET, "/api/v1/status", None, None)
            .await
            .status(),
        200
    );
    assert_eq!(
        app.request(Method::GET, "/api/v1/health", None, None)
            .await
            .status(),
        200
    );
}

#[tokio::test]
async fn catalog_reads_require_a_token() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/services", None, None).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn clients_cannot_mutate_the_catalog() {
    let app = TestApp::new().await;

    let response = app
        .client(
            Method::POST,
            "/api/v1/services",
            Some(json!({ "name": "Sneaky", "base_price_cents": 1, "base_days": 1 })),
        )
        .await;
    assert_eq!(response.status(), 403);

    let service = app.seed_service("Straight Build", 100_000, 7).await;
    let addon = app.seed_addon(service.id, "Decals", 10_000, false).await;

    // Admin-only path group: rejected by the role layer.
    let response = app
        .client(
            Method::PUT,
            &format!("/api/v1/addons/{}", addon.id),
            Some(json!({ "price_cents": 0 })),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn admin_can_manage_services() {
    let app = TestApp::new().await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/services",
            Some(json!({
                "name": "Full Custom Build",
                "description": "Strip, scribe, paint, decal, topcoat",
                "base_price_cents": 500_000,
                "base_days": 30
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;
    let service_id = body["data"]["id"].as_str().expect("service id").to_string();

    let response = app
        .admin(
            Method::PUT,
            &format!("/api/v1/services/{}", service_id),
            Some(json!({ "base_price_cents": 550_000 })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["base_price_cents"], 550_000);

    // Clients can read the catalog.
    let body = response_json(app.client(Method::GET, "/api/v1/services", None).await).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn negative_prices_are_rejected() {
    let app = TestApp::new().await;
    let response = app
        .admin(
            Method::POST,
            "/api/v1/services",
            Some(json!({ "name": "Broken", "base_price_cents": -1, "base_days": 1 })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn duplicate_complexity_slugs_conflict() {
    let app = TestApp::new().await;
    app.seed_complexity("High", "high", dec!(1.5)).await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/complexity-levels",
            Some(json!({ "name": "High again", "slug": "high", "multiplier": "1.6" })),
        )
        .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn non_positive_multipliers_are_rejected() {
    let app = TestApp::new().await;
    let response = app
        .admin(
            Method::POST,
            "/api/v1/complexity-levels",
            Some(json!({ "name": "Zero", "slug": "zero", "multiplier": "0" })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn overrides_can_be_set_and_cleared() {
    let app = TestApp::new().await;
    let service = app.seed_service("Repair", 200_000, 10).await;
    let high = app.seed_complexity("High", "high", dec!(1.5)).await;

    let response = app
        .admin(
            Method::PUT,
            &format!("/api/v1/services/{}/complexity/{}", service.id, high.id),
            Some(json!({ "multiplier": "1.75" })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(
        app.admin(
            Method::GET,
            &format!("/api/v1/services/{}/complexity", service.id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));

    // Clearing removes the row.
    let response = app
        .admin(
            Method::PUT,
            &format!("/api/v1/services/{}/complexity/{}", service.id, high.id),
            Some(json!({ "multiplier": null })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(
        app.admin(
            Method::GET,
            &format!("/api/v1/services/{}/complexity", service.id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
async fn unreferenced_services_delete_cleanly() {
    let app = TestApp::new().await;
    let service = app.seed_service("Ephemeral", 1_000, 1).await;

    let response = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/services/{}", service.id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["outcome"], "deleted");

    let response = app
        .admin(Method::GET, &format!("/api/v1/services/{}", service.id), None)
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn referenced_services_deactivate_instead_of_deleting() {
    let app = TestApp::new().await;
    let service = app.seed_service("Straight Build", 100_000, 7).await;
    let low = app.seed_complexity("Low", "low", dec!(1.0)).await;

    // Reference the service from an order line.
    let response = app
        .client(
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
        .await;
    assert_eq!(response.status(), 201);

    let response = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/services/{}", service.id),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["outcome"], "deactivated");

    // Still resolvable for history, but hidden from the default listing.
    let body = response_json(
        app.admin(Method::GET, &format!("/api/v1/services/{}", service.id), None)
            .await,
    )
    .await;
    assert_eq!(body["data"]["active"], false);

    let body = response_json(app.client(Method::GET, "/api/v1/services", None).await).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(0));

    let body = response_json(
        app.admin(Method::GET, "/api/v1/services?include_inactive=true", None)
            .await,
    )
    .await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn form_templates_are_admin_managed() {
    let app = TestApp::new().await;

    let response = app
        .client(
            Method::POST,
            "/api/v1/form-templates",
            Some(json!({ "name": "Intake", "fields": [] })),
        )
        .await;
    assert_eq!(response.status(), 403);

    let response = app
        .admin(
            Method::POST,
            "/api/v1/form-templates",
            Some(json!({
                "name": "Intake",
                "fields": [{ "key": "kit_name", "label": "Kit", "type": "text", "required": true }]
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = response_json(app.client(Method::GET, "/api/v1/form-templates", None).await).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(1));
}
