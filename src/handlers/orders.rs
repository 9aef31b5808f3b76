//! Order intake and workflow endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::handlers::common::{ensure_order_access, require_admin};
use crate::models::OrderStatus;
use crate::services::orders::{
    CreateOrderInput, OrderItemInput, OrderItemResponse, OrderResponse, StatusChange,
};
use crate::{errors::ServiceError, ApiResponse, AppState, PaginatedResponse};

// Order DTOs
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Client the order belongs to. Admins may submit on a client's behalf;
    /// for client callers this must be absent or their own id.
    pub client_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub status: Option<OrderStatus>,
    /// Admin-only filter; ignored for client callers.
    pub client_id: Option<Uuid>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    /// Version the caller's view was rendered from; the mutation is
    /// rejected when it no longer matches.
    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CancelOrderRequest {
    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct FinalizeOrderRequest {
    #[validate(range(min = 0, message = "Final price must not be negative"))]
    pub final_price_cents: i64,
    #[validate(range(min = 0, message = "Final days must not be negative"))]
    pub final_days: i32,
}

/// Transitions a client may trigger on their own order: approving a quote,
/// or cancelling while the order is still open.
fn client_may_transition(from: OrderStatus, to: OrderStatus) -> bool {
    matches!(
        (from, to),
        (OrderStatus::Estimated, OrderStatus::Approved) | (_, OrderStatus::Cancelled)
    ) || from == to
}

/// List orders with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "Clients see their own orders; admins see all and may filter by client",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("status" = Option<String>, Query, description = "Filter by workflow status"),
        ("client_id" = Option<Uuid>, Query, description = "Filter by client (admin only)"),
    ),
    responses(
        (status = 200, description = "Orders retrieved successfully"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<OrderResponse>>>, ServiceError> {
    let client_filter = if auth_user.is_admin() {
        query.client_id
    } else {
        Some(auth_user.user_id)
    };

    let result = state
        .services
        .orders
        .list_orders(query.page, query.limit, query.status, client_filter)
        .await?;

    let total_pages = result.total.div_ceil(result.per_page);
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.orders,
        total: result.total,
        page: result.page,
        limit: result.per_page,
        total_pages,
    })))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    description = "Creates the order and its kit lines, computing and persisting the estimate. \
                   Submissions with items start as `estimated`; empty ones stay `draft`.",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let client_id = match request.client_id {
        Some(id) if auth_user.is_admin() => id,
        Some(id) if id != auth_user.user_id => {
            return Err(ServiceError::Forbidden(
                "Clients can only create orders for themselves".to_string(),
            ));
        }
        _ => auth_user.user_id,
    };

    // Make sure the owning profile row exists before hanging orders off it.
    if client_id == auth_user.user_id {
        state.services.profiles.ensure_profile(&auth_user).await?;
    } else {
        state.services.profiles.get(client_id).await?;
    }

    let order = state
        .services
        .orders
        .create_order(CreateOrderInput {
            client_id,
            notes: request.notes,
            items: request.items,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Get order by ID
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;
    Ok(Json(ApiResponse::success(order)))
}

/// Get an order's items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    summary = "Get order items",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Items retrieved successfully"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_order_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<OrderItemResponse>>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;
    let items = state.services.orders.get_order_items(id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Update an order's workflow status
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    summary = "Update order status",
    description = "Validated workflow transition with optional optimistic-concurrency check. \
                   The response acknowledges the old and new status; on any error the caller \
                   must revert its local view.",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<StatusChange>),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<StatusChange>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;

    if !auth_user.is_admin() && !client_may_transition(order.status, request.status) {
        return Err(ServiceError::Forbidden(
            "Only the studio can move an order through this transition".to_string(),
        ));
    }

    let change = state
        .services
        .orders
        .update_status(id, request.status, request.expected_version)
        .await?;
    Ok(Json(ApiResponse::success(change)))
}

/// Cancel an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    summary = "Cancel order",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<StatusChange>),
        (status = 400, description = "Order is already closed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<CancelOrderRequest>,
) -> Result<Json<ApiResponse<StatusChange>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;

    let change = state
        .services
        .orders
        .update_status(id, OrderStatus::Cancelled, request.expected_version)
        .await?;
    Ok(Json(ApiResponse::success(change)))
}

/// Record the final price and duration of a completed build (admin)
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/final",
    summary = "Finalize order",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = FinalizeOrderRequest,
    responses(
        (status = 200, description = "Final values recorded"),
        (status = 400, description = "Order is not completed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn finalize_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<FinalizeOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    require_admin(&auth_user)?;
    request.validate()?;
    let order = state
        .services
        .orders
        .set_final(id, request.final_price_cents, request.final_days)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
