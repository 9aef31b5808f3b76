//! Kitstudio API Library
//!
//! Backend for custom model-kit build studios: service/complexity/add-on
//! catalogs, price and duration estimation, order workflow tracking with
//! kanban/calendar projections, change requests, and progress logging.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod estimation;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod projection;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All `/api/v1` routes.
///
/// Status and health are open; everything else requires a valid bearer
/// token. Paths that are admin-only end to end sit behind the role layer;
/// mixed paths (reads for everyone, writes for staff) enforce the role in
/// the handler.
pub fn api_v1_routes() -> Router<AppState> {
    let general = Router::new()
        // Catalog
        .route(
            "/services",
            get(handlers::services::list_services).post(handlers::services::create_service),
        )
        .route(
            "/services/:id",
            get(handlers::services::get_service)
                .put(handlers::services::update_service)
                .delete(handlers::services::delete_service),
        )
        .route(
            "/services/:id/addons",
            get(handlers::services::list_addons).post(handlers::services::create_addon),
        )
        .route(
            "/services/:id/complexity",
            get(handlers::complexity::list_overrides),
        )
        .route(
            "/complexity-levels",
            get(handlers::complexity::list_complexity_levels)
                .post(handlers::complexity::create_complexity_level),
        )
        // Estimation
        .route("/estimates", axum::routing::post(handlers::estimates::create_estimate))
        // Orders
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/orders/:id/items", get(handlers::orders::get_order_items))
        .route(
            "/orders/:id/status",
            axum::routing::put(handlers::orders::update_order_status),
        )
        .route(
            "/orders/:id/cancel",
            axum::routing::post(handlers::orders::cancel_order),
        )
        .route(
            "/orders/:id/change-requests",
            get(handlers::change_requests::list_change_requests)
                .post(handlers::change_requests::create_change_request),
        )
        .route(
            "/orders/:id/progress",
            get(handlers::progress::list_progress).post(handlers::progress::create_progress),
        )
        // Projections
        .route("/board", get(handlers::board::get_board))
        .route("/calendar", get(handlers::board::get_calendar))
        // Profiles & forms
        .route("/profiles/me", get(handlers::profiles::get_me))
        .route(
            "/form-templates",
            get(handlers::form_templates::list_form_templates)
                .post(handlers::form_templates::create_form_template),
        )
        .route(
            "/form-templates/:id",
            get(handlers::form_templates::get_form_template)
                .put(handlers::form_templates::update_form_template)
                .delete(handlers::form_templates::delete_form_template),
        )
        .with_auth();

    let admin = Router::new()
        .route(
            "/complexity-levels/:id",
            axum::routing::put(handlers::complexity::update_complexity_level)
                .delete(handlers::complexity::delete_complexity_level),
        )
        .route(
            "/addons/:id",
            axum::routing::put(handlers::services::update_addon)
                .delete(handlers::services::delete_addon),
        )
        .route(
            "/services/:id/complexity/:complexity_id",
            axum::routing::put(handlers::complexity::set_override),
        )
        .route(
            "/orders/:id/final",
            axum::routing::put(handlers::orders::finalize_order),
        )
        .route(
            "/change-requests/:id/approve",
            axum::routing::post(handlers::change_requests::approve_change_request),
        )
        .route(
            "/change-requests/:id/reject",
            axum::routing::post(handlers::change_requests::reject_change_request),
        )
        .route("/profiles", get(handlers::profiles::list_profiles))
        .route(
            "/profiles/:id",
            axum::routing::put(handlers::profiles::update_profile),
        )
        .with_role("admin");

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(general)
        .merge(admin)
}

/// Builds the full application router shared by the binary and the tests.
pub fn app_router(
    state: AppState,
    auth_service: Arc<auth::AuthService>,
    cors_layer: CorsLayer,
) -> Router {
    Router::new()
        .route("/", get(|| async { "kitstudio-api up" }))
        .nest("/api/v1", api_v1_routes())
        .nest(
            "/auth",
            auth::auth_routes().with_state(auth_service.clone()),
        )
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            |State(auth): State<Arc<auth::AuthService>>,
             mut req: axum::http::Request<axum::body::Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "kitstudio-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
