//! Kanban and calendar projections.
//!
//! Both endpoints are pure reads: they derive buckets, urgency colors and
//! progress from the persisted status and timestamps on every request.

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::OrderStatus;
use crate::projection::{
    due_date, due_state, kanban_bucket, progress_percent, DueState, KanbanBucket,
};
use crate::services::orders::OrderResponse;
use crate::{errors::ServiceError, ApiResponse, AppState};

/// Card rendered in a kanban column or on the calendar.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderCard {
    pub id: Uuid,
    pub order_number: String,
    pub client_id: Uuid,
    pub status: OrderStatus,
    pub estimated_price_cents: i64,
    pub estimated_days: i32,
    pub due_date: NaiveDate,
    pub due_state: DueState,
    /// Marker color derived from `due_state`.
    pub color: String,
    pub progress_percent: u8,
    /// Pass back as `expected_version` when dragging the card.
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BoardColumn {
    pub bucket: KanbanBucket,
    pub orders: Vec<OrderCard>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BoardResponse {
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    /// Inclusive lower bound on due date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on due date.
    pub to: Option<NaiveDate>,
}

fn to_card(order: &OrderResponse, today: NaiveDate) -> OrderCard {
    let due = due_date(order.created_at, order.estimated_days);
    let state = due_state(order.status, due, today);
    OrderCard {
        id: order.id,
        order_number: order.order_number.clone(),
        client_id: order.client_id,
        status: order.status,
        estimated_price_cents: order.estimated_price_cents,
        estimated_days: order.estimated_days,
        due_date: due,
        due_state: state,
        color: state.color().to_string(),
        progress_percent: progress_percent(
            order.status,
            order.created_at,
            order.estimated_days,
            today,
        ),
        version: order.version,
    }
}

/// Kanban board
#[utoipa::path(
    get,
    path = "/api/v1/board",
    summary = "Kanban board",
    description = "Orders grouped into the four workflow columns. Clients see only their own.",
    responses((status = 200, description = "Board computed", body = ApiResponse<BoardResponse>)),
    security(("Bearer" = []))
)]
pub async fn get_board(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<BoardResponse>>, ServiceError> {
    let client_filter = (!auth_user.is_admin()).then_some(auth_user.user_id);
    let orders = state
        .services
        .orders
        .list_for_projection(client_filter)
        .await?;

    let today = Utc::now().date_naive();
    // Stable column order regardless of content.
    let columns = [
        KanbanBucket::Todo,
        KanbanBucket::InProgress,
        KanbanBucket::UnderReview,
        KanbanBucket::Completed,
    ]
    .into_iter()
    .map(|bucket| BoardColumn {
        bucket,
        orders: orders
            .iter()
            .filter(|order| kanban_bucket(order.status) == bucket)
            .map(|order| to_card(order, today))
            .collect(),
    })
    .collect();

    Ok(Json(ApiResponse::success(BoardResponse { columns })))
}

/// Calendar markers
#[utoipa::path(
    get,
    path = "/api/v1/calendar",
    summary = "Calendar markers",
    description = "Due-date markers with urgency colors, optionally bounded to a date range.",
    params(
        ("from" = Option<NaiveDate>, Query, description = "Inclusive lower bound on due date"),
        ("to" = Option<NaiveDate>, Query, description = "Inclusive upper bound on due date"),
    ),
    responses((status = 200, description = "Calendar computed")),
    security(("Bearer" = []))
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<Vec<OrderCard>>>, ServiceError> {
    let client_filter = (!auth_user.is_admin()).then_some(auth_user.user_id);
    let orders = state
        .services
        .orders
        .list_for_projection(client_filter)
        .await?;

    let today = Utc::now().date_naive();
    let cards = orders
        .iter()
        .map(|order| to_card(order, today))
        .filter(|card| {
            query.from.map_or(true, |from| card.due_date >= from)
                && query.to.map_or(true, |to| card.due_date <= to)
        })
        .collect();

    Ok(Json(ApiResponse::success(cards)))
}
