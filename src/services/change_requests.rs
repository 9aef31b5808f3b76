use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        change_request::{self, Entity as ChangeRequestEntity, Model as ChangeRequestModel},
        order::{self, Entity as OrderEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ChangeRequestStatus, OrderStatus},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateChangeRequest {
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,
    /// Signed price delta in minor units applied to the estimate on approval.
    #[serde(default)]
    pub price_impact_cents: i64,
    /// Signed day delta applied to the estimated duration on approval.
    #[serde(default)]
    pub day_impact: i32,
}

/// Change requests adjust an order's scope after submission. Approval is the
/// only path that mutates a persisted estimate.
#[derive(Clone)]
pub struct ChangeRequestService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ChangeRequestService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send domain event");
            }
        }
    }

    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn create(
        &self,
        order_id: Uuid,
        request: CreateChangeRequest,
    ) -> Result<ChangeRequestModel, ServiceError> {
        request.validate()?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let status = OrderStatus::from_str(&order.status).map_err(|_| {
            ServiceError::InternalError(format!("Order {} has unknown status", order_id))
        })?;
        if !matches!(
            status,
            OrderStatus::Estimated | OrderStatus::Approved | OrderStatus::InProgress
        ) {
            return Err(ServiceError::InvalidOperation(format!(
                "Change requests cannot be raised against a {} order",
                status
            )));
        }

        let model = change_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            description: Set(request.description),
            price_impact_cents: Set(request.price_impact_cents),
            day_impact: Set(request.day_impact),
            status: Set(ChangeRequestStatus::Pending.to_string()),
            decided_at: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(change_request_id = %model.id, order_id = %order_id, "Change request created");
        self.emit(Event::ChangeRequestCreated(model.id)).await;
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ChangeRequestModel, ServiceError> {
        ChangeRequestEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Change request {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<ChangeRequestModel>, ServiceError> {
        Ok(ChangeRequestEntity::find()
            .filter(change_request::Column::OrderId.eq(order_id))
            .order_by_asc(change_request::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Approves a pending request and applies its price/day impacts to the
    /// parent order's estimate, atomically.
    #[instrument(skip(self), fields(change_request_id = %id))]
    pub async fn approve(&self, id: Uuid) -> Result<ChangeRequestModel, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin transaction for change request approval");
            ServiceError::DatabaseError(e)
        })?;

        let request = ChangeRequestEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Change request {} not found", id)))?;

        let current = ChangeRequestStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InternalError(format!("Change request {} has unknown status", id))
        })?;
        if current != ChangeRequestStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Change request {} has already been {}",
                id, current
            )));
        }

        let order = OrderEntity::find_by_id(request.order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", request.order_id))
            })?;

        let new_price = order.estimated_price_cents + request.price_impact_cents;
        let new_days = order.estimated_days + request.day_impact;
        if new_price < 0 || new_days < 0 {
            return Err(ServiceError::ValidationError(
                "Approving this change request would make the estimate negative".to_string(),
            ));
        }

        let order_id = order.id;
        let version = order.version;
        let mut order_active: order::ActiveModel = order.into();
        order_active.estimated_price_cents = Set(new_price);
        order_active.estimated_days = Set(new_days);
        order_active.updated_at = Set(Some(Utc::now()));
        order_active.version = Set(version + 1);
        order_active.update(&txn).await?;

        let mut request_active: change_request::ActiveModel = request.into();
        request_active.status = Set(ChangeRequestStatus::Approved.to_string());
        request_active.decided_at = Set(Some(Utc::now()));
        request_active.updated_at = Set(Some(Utc::now()));
        let updated = request_active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, change_request_id = %id, "Failed to commit change request approval");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            change_request_id = %id,
            order_id = %order_id,
            new_price_cents = new_price,
            new_days = new_days,
            "Change request approved"
        );
        self.emit(Event::ChangeRequestApproved {
            change_request_id: id,
            order_id,
        })
        .await;
        Ok(updated)
    }

    /// Rejects a pending request; the parent order is left untouched.
    #[instrument(skip(self), fields(change_request_id = %id))]
    pub async fn reject(&self, id: Uuid) -> Result<ChangeRequestModel, ServiceError> {
        let request = self.get(id).await?;

        let current = ChangeRequestStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InternalError(format!("Change request {} has unknown status", id))
        })?;
        if current != ChangeRequestStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Change request {} has already been {}",
                id, current
            )));
        }

        let mut active: change_request::ActiveModel = request.into();
        active.status = Set(ChangeRequestStatus::Rejected.to_string());
        active.decided_at = Set(Some(Utc::now()));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await?;

        info!(change_request_id = %id, "Change request rejected");
        self.emit(Event::ChangeRequestRejected(id)).await;
        Ok(updated)
    }
}
