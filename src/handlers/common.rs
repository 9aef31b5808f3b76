use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::orders::OrderResponse;

/// Clients may only see and act on their own orders; admins see everything.
pub fn ensure_order_access(user: &AuthUser, order: &OrderResponse) -> Result<(), ServiceError> {
    if user.is_admin() || order.client_id == user.user_id {
        return Ok(());
    }
    Err(ServiceError::Forbidden(
        "You do not have access to this order".to_string(),
    ))
}

/// Mutating catalog and workflow surfaces are studio-staff only.
pub fn require_admin(user: &AuthUser) -> Result<(), ServiceError> {
    if user.is_admin() {
        return Ok(());
    }
    Err(ServiceError::Forbidden(
        "Administrator role required".to_string(),
    ))
}

/// Query flag shared by catalog list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct IncludeInactiveQuery {
    /// Also return deactivated entries (admin screens).
    #[serde(default)]
    pub include_inactive: bool,
}
