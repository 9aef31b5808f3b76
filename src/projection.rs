//! Read-only projections of order workflow state.
//!
//! Kanban buckets, calendar urgency and progress percentages are derived on
//! every request from the persisted status and timestamps; nothing here is
//! ever written back.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

use crate::models::OrderStatus;

/// Kanban column an order is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum KanbanBucket {
    Todo,
    InProgress,
    UnderReview,
    Completed,
}

/// Calendar urgency of an order's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DueState {
    Completed,
    Overdue,
    DueToday,
    Upcoming,
}

impl DueState {
    /// Marker color the dashboard renders for this state.
    pub fn color(self) -> &'static str {
        match self {
            DueState::Completed => "green",
            DueState::Overdue => "red",
            DueState::DueToday => "orange",
            DueState::Upcoming => "blue",
        }
    }
}

/// Maps workflow status to its kanban column.
///
/// Cancelled orders land in the review column so they stay visible for
/// follow-up instead of reappearing as open work.
pub fn kanban_bucket(status: OrderStatus) -> KanbanBucket {
    match status {
        OrderStatus::Draft | OrderStatus::Estimated => KanbanBucket::Todo,
        OrderStatus::Approved | OrderStatus::InProgress => KanbanBucket::InProgress,
        OrderStatus::Completed => KanbanBucket::Completed,
        OrderStatus::Cancelled => KanbanBucket::UnderReview,
    }
}

/// Due date of an order: creation date plus the estimated duration.
pub fn due_date(created_at: DateTime<Utc>, estimated_days: i32) -> NaiveDate {
    (created_at + Duration::days(estimated_days as i64)).date_naive()
}

/// Calendar urgency, compared at date granularity (midnight), so the
/// answer does not drift over the course of the day.
pub fn due_state(status: OrderStatus, due: NaiveDate, today: NaiveDate) -> DueState {
    if status == OrderStatus::Completed {
        return DueState::Completed;
    }
    if due < today {
        DueState::Overdue
    } else if due == today {
        DueState::DueToday
    } else {
        DueState::Upcoming
    }
}

/// Coarse completion percentage for progress bars.
///
/// In-progress orders advance linearly across the estimated window but are
/// capped below 100 until the status itself says completed.
pub fn progress_percent(
    status: OrderStatus,
    created_at: DateTime<Utc>,
    estimated_days: i32,
    today: NaiveDate,
) -> u8 {
    match status {
        OrderStatus::Draft | OrderStatus::Cancelled => 0,
        OrderStatus::Estimated => 10,
        OrderStatus::Approved => 25,
        OrderStatus::Completed => 100,
        OrderStatus::InProgress => {
            if estimated_days <= 0 {
                return 90;
            }
            let elapsed = (today - created_at.date_naive()).num_days().max(0);
            let fraction = (elapsed as f64 / estimated_days as f64).clamp(0.0, 1.0);
            let percent = 25.0 + fraction * 65.0;
            percent.round().min(90.0) as u8
        }
    }
}
