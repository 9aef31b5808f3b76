//! Profile endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::handlers::common::require_admin;
use crate::entities::profile;
use crate::services::profiles::UpdateProfile;
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery, PaginatedResponse};

/// The caller's own profile, created on first contact.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    summary = "Get own profile",
    responses((status = 200, description = "Profile retrieved successfully")),
    security(("Bearer" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<profile::Model>>, ServiceError> {
    let profile = state.services.profiles.ensure_profile(&auth_user).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// List profiles (admin)
#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    summary = "List profiles",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses((status = 200, description = "Profiles retrieved successfully")),
    security(("Bearer" = []))
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PaginatedResponse<profile::Model>>>, ServiceError> {
    require_admin(&auth_user)?;
    let result = state
        .services
        .profiles
        .list(query.page, query.limit)
        .await?;
    let total_pages = result.total.div_ceil(result.per_page);
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.profiles,
        total: result.total,
        page: result.page,
        limit: result.per_page,
        total_pages,
    })))
}

/// Update a profile (admin)
#[utoipa::path(
    put,
    path = "/api/v1/profiles/{id}",
    summary = "Update profile",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated successfully"),
        (status = 404, description = "Profile not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateProfile>,
) -> Result<Json<ApiResponse<profile::Model>>, ServiceError> {
    require_admin(&auth_user)?;
    let profile = state.services.profiles.update(id, request).await?;
    Ok(Json(ApiResponse::success(profile)))
}
