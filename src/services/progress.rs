use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        order::Entity as OrderEntity,
        order_item::Entity as OrderItemEntity,
        progress_log::{self, Entity as ProgressLogEntity, Model as ProgressLogModel},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProgressLog {
    /// Optional kit the update refers to; must belong to the order.
    pub order_item_id: Option<Uuid>,
    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,
    /// Public URL of an already-uploaded photo.
    #[validate(url(message = "Photo URL must be a valid URL"))]
    pub photo_url: Option<String>,
}

/// Append-only build-progress trail per order.
#[derive(Clone)]
pub struct ProgressService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProgressService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn append(
        &self,
        order_id: Uuid,
        request: CreateProgressLog,
    ) -> Result<ProgressLogModel, ServiceError> {
        request.validate()?;

        OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if let Some(item_id) = request.order_item_id {
            let item = OrderItemEntity::find_by_id(item_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Order item {} not found", item_id))
                })?;
            if item.order_id != order_id {
                return Err(ServiceError::ValidationError(format!(
                    "Order item {} does not belong to order {}",
                    item_id, order_id
                )));
            }
        }

        let model = progress_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            order_item_id: Set(request.order_item_id),
            message: Set(request.message),
            photo_url: Set(request.photo_url),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(log_id = %model.id, order_id = %order_id, "Progress logged");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::ProgressLogged {
                    order_id,
                    log_id: model.id,
                })
                .await
            {
                warn!(error = %e, "Failed to send domain event");
            }
        }
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<ProgressLogModel>, ServiceError> {
        Ok(ProgressLogEntity::find()
            .filter(progress_log::Column::OrderId.eq(order_id))
            .order_by_asc(progress_log::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}
