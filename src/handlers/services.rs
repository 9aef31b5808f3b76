//! Service-type and add-on catalog endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::entities::{service_addon, service_type};
use crate::auth::AuthUser;
use crate::handlers::common::{require_admin, IncludeInactiveQuery};
use crate::services::catalog::{CreateAddon, CreateServiceType, UpdateAddon, UpdateServiceType};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// List services
#[utoipa::path(
    get,
    path = "/api/v1/services",
    summary = "List services",
    description = "All active services in catalog order; admins can include deactivated ones",
    params(IncludeInactiveQuery),
    responses(
        (status = 200, description = "Services retrieved successfully"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<IncludeInactiveQuery>,
) -> Result<Json<ApiResponse<Vec<service_type::Model>>>, ServiceError> {
    let services = state
        .services
        .catalog
        .list_services(query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::success(services)))
}

/// Get one service
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    summary = "Get service",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service retrieved successfully"),
        (status = 404, description = "Service not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<service_type::Model>>, ServiceError> {
    let service = state.services.catalog.get_service(id).await?;
    Ok(Json(ApiResponse::success(service)))
}

/// Create a service
#[utoipa::path(
    post,
    path = "/api/v1/services",
    summary = "Create service",
    request_body = CreateServiceType,
    responses(
        (status = 201, description = "Service created successfully"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_service(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateServiceType>,
) -> Result<(StatusCode, Json<ApiResponse<service_type::Model>>), ServiceError> {
    require_admin(&auth_user)?;
    let service = state.services.catalog.create_service(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(service))))
}

/// Update a service
#[utoipa::path(
    put,
    path = "/api/v1/services/{id}",
    summary = "Update service",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateServiceType,
    responses(
        (status = 200, description = "Service updated successfully"),
        (status = 404, description = "Service not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateServiceType>,
) -> Result<Json<ApiResponse<service_type::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let service = state.services.catalog.update_service(id, request).await?;
    Ok(Json(ApiResponse::success(service)))
}

/// Delete (or deactivate) a service
#[utoipa::path(
    delete,
    path = "/api/v1/services/{id}",
    summary = "Delete service",
    description = "Deletes the service, or deactivates it when orders reference it",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service deleted or deactivated"),
        (status = 404, description = "Service not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    require_admin(&auth_user)?;
    let outcome = state.services.catalog.delete_service(id).await?;
    Ok(Json(ApiResponse::success(json!({ "outcome": outcome }))))
}

/// List a service's add-ons
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}/addons",
    summary = "List add-ons",
    params(
        ("id" = Uuid, Path, description = "Service ID"),
        IncludeInactiveQuery,
    ),
    responses(
        (status = 200, description = "Add-ons retrieved successfully"),
        (status = 404, description = "Service not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_addons(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<IncludeInactiveQuery>,
) -> Result<Json<ApiResponse<Vec<service_addon::Model>>>, ServiceError> {
    let addons = state
        .services
        .catalog
        .list_addons(id, query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::success(addons)))
}

/// Create an add-on under a service
#[utoipa::path(
    post,
    path = "/api/v1/services/{id}/addons",
    summary = "Create add-on",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = CreateAddon,
    responses(
        (status = 201, description = "Add-on created successfully"),
        (status = 404, description = "Service not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_addon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<CreateAddon>,
) -> Result<(StatusCode, Json<ApiResponse<service_addon::Model>>), ServiceError> {
    require_admin(&auth_user)?;
    let addon = state.services.catalog.create_addon(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(addon))))
}

/// Update an add-on
#[utoipa::path(
    put,
    path = "/api/v1/addons/{id}",
    summary = "Update add-on",
    params(("id" = Uuid, Path, description = "Add-on ID")),
    request_body = UpdateAddon,
    responses(
        (status = 200, description = "Add-on updated successfully"),
        (status = 404, description = "Add-on not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_addon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateAddon>,
) -> Result<Json<ApiResponse<service_addon::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let addon = state.services.catalog.update_addon(id, request).await?;
    Ok(Json(ApiResponse::success(addon)))
}

/// Delete (or deactivate) an add-on
#[utoipa::path(
    delete,
    path = "/api/v1/addons/{id}",
    summary = "Delete add-on",
    params(("id" = Uuid, Path, description = "Add-on ID")),
    responses(
        (status = 200, description = "Add-on deleted or deactivated"),
        (status = 404, description = "Add-on not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_addon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    require_admin(&auth_user)?;
    let outcome = state.services.catalog.delete_addon(id).await?;
    Ok(Json(ApiResponse::success(json!({ "outcome": outcome }))))
}
