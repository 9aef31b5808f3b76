//! Change-request endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::change_request;
use crate::handlers::common::{ensure_order_access, require_admin};
use crate::services::change_requests::CreateChangeRequest;
use crate::{errors::ServiceError, ApiResponse, AppState};

/// List an order's change requests
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/change-requests",
    summary = "List change requests",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Change requests retrieved successfully"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_change_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<change_request::Model>>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;

    let requests = state.services.change_requests.list_for_order(id).await?;
    Ok(Json(ApiResponse::success(requests)))
}

/// Raise a change request against an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/change-requests",
    summary = "Create change request",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CreateChangeRequest,
    responses(
        (status = 201, description = "Change request created"),
        (status = 400, description = "Order does not accept change requests", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_change_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<CreateChangeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<change_request::Model>>), ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;

    let created = state.services.change_requests.create(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Approve a pending change request (admin)
#[utoipa::path(
    post,
    path = "/api/v1/change-requests/{id}/approve",
    summary = "Approve change request",
    description = "Marks the request approved and applies its price/day impacts to the \
                   parent order's estimate in one transaction.",
    params(("id" = Uuid, Path, description = "Change request ID")),
    responses(
        (status = 200, description = "Change request approved"),
        (status = 404, description = "Change request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already decided", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn approve_change_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<change_request::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let updated = state.services.change_requests.approve(id).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Reject a pending change request (admin)
#[utoipa::path(
    post,
    path = "/api/v1/change-requests/{id}/reject",
    summary = "Reject change request",
    params(("id" = Uuid, Path, description = "Change request ID")),
    responses(
        (status = 200, description = "Change request rejected"),
        (status = 404, description = "Change request not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already decided", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn reject_change_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<change_request::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let updated = state.services.change_requests.reject(id).await?;
    Ok(Json(ApiResponse::success(updated)))
}
