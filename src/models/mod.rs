//! Domain enums shared across entities, services and handlers.
//!
//! Statuses are persisted as strings; the enums here are the single source of
//! truth for parsing, serialization and the workflow transition table.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Workflow status of an order.
///
/// Orders move forward through `draft → estimated → approved → in_progress →
/// completed`. `cancelled` is reachable from every non-terminal status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Estimated,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `self → to` is a legal workflow transition.
    ///
    /// Re-asserting the current status is a no-op and always allowed, so a
    /// retried mutation does not fail spuriously.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        if self == to {
            return true;
        }
        match (self, to) {
            (Draft, Estimated) => true,
            (Estimated, Approved) => true,
            (Approved, InProgress) => true,
            (InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Review state of a change request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Role carried in the identity provider's token; gates admin-only surfaces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Client,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::Estimated,
            OrderStatus::Approved,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let text = status.to_string();
            assert_eq!(OrderStatus::from_str(&text).unwrap(), status);
        }
        assert_eq!(OrderStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(OrderStatus::Draft.can_transition_to(OrderStatus::Estimated));
        assert!(OrderStatus::Estimated.can_transition_to(OrderStatus::Approved));
        assert!(OrderStatus::Approved.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::Approved));
        assert!(!OrderStatus::Estimated.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn moving_backwards_is_rejected() {
        assert!(!OrderStatus::Approved.can_transition_to(OrderStatus::Estimated));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn cancel_is_reachable_from_non_terminal_states_only() {
        assert!(OrderStatus::Draft.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Estimated.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Approved.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn same_status_is_a_noop() {
        assert!(OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::InProgress));
    }
}
