//! Complexity-level catalog and per-service override endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{complexity_level, service_complexity};
use crate::auth::AuthUser;
use crate::handlers::common::{require_admin, IncludeInactiveQuery};
use crate::services::catalog::{CreateComplexityLevel, UpdateComplexityLevel};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// Body for setting or clearing a per-service multiplier override.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetOverrideRequest {
    /// New override multiplier; `null` clears the override so the tier's
    /// default applies again.
    pub multiplier: Option<Decimal>,
}

/// List complexity levels
#[utoipa::path(
    get,
    path = "/api/v1/complexity-levels",
    summary = "List complexity levels",
    params(IncludeInactiveQuery),
    responses((status = 200, description = "Complexity levels retrieved successfully")),
    security(("Bearer" = []))
)]
pub async fn list_complexity_levels(
    State(state): State<AppState>,
    Query(query): Query<IncludeInactiveQuery>,
) -> Result<Json<ApiResponse<Vec<complexity_level::Model>>>, ServiceError> {
    let levels = state
        .services
        .catalog
        .list_complexity_levels(query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::success(levels)))
}

/// Create a complexity level
#[utoipa::path(
    post,
    path = "/api/v1/complexity-levels",
    summary = "Create complexity level",
    request_body = CreateComplexityLevel,
    responses(
        (status = 201, description = "Complexity level created successfully"),
        (status = 409, description = "Slug already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_complexity_level(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateComplexityLevel>,
) -> Result<(StatusCode, Json<ApiResponse<complexity_level::Model>>), ServiceError> {
    require_admin(&auth_user)?;
    let level = state
        .services
        .catalog
        .create_complexity_level(request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(level))))
}

/// Update a complexity level
#[utoipa::path(
    put,
    path = "/api/v1/complexity-levels/{id}",
    summary = "Update complexity level",
    params(("id" = Uuid, Path, description = "Complexity level ID")),
    request_body = UpdateComplexityLevel,
    responses(
        (status = 200, description = "Complexity level updated successfully"),
        (status = 404, description = "Complexity level not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_complexity_level(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateComplexityLevel>,
) -> Result<Json<ApiResponse<complexity_level::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let level = state
        .services
        .catalog
        .update_complexity_level(id, request)
        .await?;
    Ok(Json(ApiResponse::success(level)))
}

/// Delete (or deactivate) a complexity level
#[utoipa::path(
    delete,
    path = "/api/v1/complexity-levels/{id}",
    summary = "Delete complexity level",
    params(("id" = Uuid, Path, description = "Complexity level ID")),
    responses((status = 200, description = "Complexity level deleted or deactivated")),
    security(("Bearer" = []))
)]
pub async fn delete_complexity_level(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    require_admin(&auth_user)?;
    let outcome = state.services.catalog.delete_complexity_level(id).await?;
    Ok(Json(ApiResponse::success(json!({ "outcome": outcome }))))
}

/// List a service's multiplier overrides
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}/complexity",
    summary = "List service overrides",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "Overrides retrieved successfully")),
    security(("Bearer" = []))
)]
pub async fn list_overrides(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<service_complexity::Model>>>, ServiceError> {
    let overrides = state.services.catalog.list_overrides(id).await?;
    Ok(Json(ApiResponse::success(overrides)))
}

/// Set or clear a per-service multiplier override
#[utoipa::path(
    put,
    path = "/api/v1/services/{id}/complexity/{complexity_id}",
    summary = "Set service override",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        ("complexity_id" = Uuid, Path, description = "Complexity level ID"),
    ),
    request_body = SetOverrideRequest,
    responses(
        (status = 200, description = "Override set or cleared"),
        (status = 404, description = "Service or complexity level not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn set_override(
    State(state): State<AppState>,
    Path((id, complexity_id)): Path<(Uuid, Uuid)>,
    auth_user: AuthUser,
    Json(request): Json<SetOverrideRequest>,
) -> Result<Json<ApiResponse<Option<service_complexity::Model>>>, ServiceError> {
    require_admin(&auth_user)?;
    let row = state
        .services
        .catalog
        .set_override(id, complexity_id, request.multiplier)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}
