//! Intake form-template endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::entities::form_template;
use crate::auth::AuthUser;
use crate::handlers::common::{require_admin, IncludeInactiveQuery};
use crate::services::form_templates::{CreateFormTemplate, UpdateFormTemplate};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// List form templates
#[utoipa::path(
    get,
    path = "/api/v1/form-templates",
    summary = "List form templates",
    params(IncludeInactiveQuery),
    responses((status = 200, description = "Form templates retrieved successfully")),
    security(("Bearer" = []))
)]
pub async fn list_form_templates(
    State(state): State<AppState>,
    Query(query): Query<IncludeInactiveQuery>,
) -> Result<Json<ApiResponse<Vec<form_template::Model>>>, ServiceError> {
    let templates = state
        .services
        .form_templates
        .list(query.include_inactive)
        .await?;
    Ok(Json(ApiResponse::success(templates)))
}

/// Get one form template
#[utoipa::path(
    get,
    path = "/api/v1/form-templates/{id}",
    summary = "Get form template",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Form template retrieved successfully"),
        (status = 404, description = "Template not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_form_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<form_template::Model>>, ServiceError> {
    let template = state.services.form_templates.get(id).await?;
    Ok(Json(ApiResponse::success(template)))
}

/// Create a form template (admin)
#[utoipa::path(
    post,
    path = "/api/v1/form-templates",
    summary = "Create form template",
    request_body = CreateFormTemplate,
    responses((status = 201, description = "Form template created successfully")),
    security(("Bearer" = []))
)]
pub async fn create_form_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateFormTemplate>,
) -> Result<(StatusCode, Json<ApiResponse<form_template::Model>>), ServiceError> {
    require_admin(&auth_user)?;
    let template = state.services.form_templates.create(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(template))))
}

/// Update a form template (admin)
#[utoipa::path(
    put,
    path = "/api/v1/form-templates/{id}",
    summary = "Update form template",
    params(("id" = Uuid, Path, description = "Template ID")),
    request_body = UpdateFormTemplate,
    responses(
        (status = 200, description = "Form template updated successfully"),
        (status = 404, description = "Template not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_form_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateFormTemplate>,
) -> Result<Json<ApiResponse<form_template::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let template = state.services.form_templates.update(id, request).await?;
    Ok(Json(ApiResponse::success(template)))
}

/// Delete a form template (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/form-templates/{id}",
    summary = "Delete form template",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Form template deleted"),
        (status = 404, description = "Template not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_form_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    require_admin(&auth_user)?;
    state.services.form_templates.delete(id).await?;
    Ok(Json(ApiResponse::success(json!({ "deleted": true }))))
}
