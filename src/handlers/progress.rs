//! Build-progress log endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::progress_log;
use crate::handlers::common::{ensure_order_access, require_admin};
use crate::services::progress::CreateProgressLog;
use crate::{errors::ServiceError, ApiResponse, AppState};

/// List an order's progress trail
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/progress",
    summary = "List progress logs",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Progress logs retrieved successfully"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<progress_log::Model>>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
    ensure_order_access(&auth_user, &order)?;

    let logs = state.services.progress.list_for_order(id).await?;
    Ok(Json(ApiResponse::success(logs)))
}

/// Append a progress entry (admin)
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/progress",
    summary = "Append progress log",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CreateProgressLog,
    responses(
        (status = 201, description = "Progress logged"),
        (status = 400, description = "Invalid item reference", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<CreateProgressLog>,
) -> Result<(StatusCode, Json<ApiResponse<progress_log::Model>>), ServiceError> {
    require_admin(&auth_user)?;
    let log = state.services.progress.append(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(log))))
}
