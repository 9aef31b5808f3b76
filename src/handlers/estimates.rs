//! Quote endpoint: runs the estimation engine without persisting anything.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::estimation::OrderEstimate;
use crate::services::estimation::LineSelection;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EstimateRequest {
    #[validate(length(min = 1, message = "At least one line is required"))]
    pub items: Vec<LineSelection>,
}

/// Quote an order without creating it
#[utoipa::path(
    post,
    path = "/api/v1/estimates",
    summary = "Quote an order",
    description = "Computes price and duration for the given (service, complexity, add-ons) \
                   selections against the current catalogs. Nothing is persisted.",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Estimate computed", body = ApiResponse<OrderEstimate>),
        (status = 400, description = "Invalid selection", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown service or complexity", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<ApiResponse<OrderEstimate>>, ServiceError> {
    request.validate()?;
    let estimate = state.services.estimation.quote(&request.items).await?;
    Ok(Json(ApiResponse::success(estimate)))
}
