use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel},
        order_item::{self, Entity as OrderItemEntity},
        order_item_addon::{self, Entity as OrderItemAddonEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::OrderStatus,
    services::estimation::{EstimationService, LineSelection},
};

/// Request/response types for the order service
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderInput {
    pub client_id: Uuid,
    pub notes: Option<String>,
    /// Kits to build. An empty list creates a draft that can be estimated
    /// later.
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OrderItemInput {
    #[validate(length(min = 1, max = 200, message = "Kit name is required"))]
    pub kit_name: String,
    pub kit_grade: Option<String>,
    pub service_id: Uuid,
    pub complexity_id: Uuid,
    #[serde(default)]
    pub addon_ids: Vec<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub client_id: Uuid,
    pub status: OrderStatus,
    pub estimated_price_cents: i64,
    pub estimated_days: i32,
    pub final_price_cents: Option<i64>,
    pub final_days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kit_name: String,
    pub kit_grade: Option<String>,
    pub service_id: Uuid,
    pub complexity_id: Uuid,
    pub notes: Option<String>,
    pub subtotal_cents: i64,
    pub addon_total_cents: i64,
    pub total_cents: i64,
    pub duration_days: i32,
    pub addon_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Result of a status mutation: the acknowledgment the UI commits its
/// optimistic kanban state against.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub order: OrderResponse,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}

/// Service for managing orders and their workflow status.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    estimation: EstimationService,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        estimation: EstimationService,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            estimation,
            event_sender,
        }
    }

    fn new_order_number() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("KB-{}", id[..8].to_uppercase())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send domain event");
            }
        }
    }

    fn model_to_response(&self, model: OrderModel) -> Result<OrderResponse, ServiceError> {
        let status = OrderStatus::from_str(&model.status).map_err(|_| {
            error!(order_id = %model.id, status = %model.status, "Order has unknown status");
            ServiceError::InternalError(format!("Order {} has unknown status", model.id))
        })?;
        Ok(OrderResponse {
            id: model.id,
            order_number: model.order_number,
            client_id: model.client_id,
            status,
            estimated_price_cents: model.estimated_price_cents,
            estimated_days: model.estimated_days,
            final_price_cents: model.final_price_cents,
            final_days: model.final_days,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        })
    }

    /// Creates an order with its items, computing and persisting the
    /// estimate in the same transaction. Orders with items start life as
    /// `estimated`; empty submissions stay `draft`.
    #[instrument(skip(self, input), fields(client_id = %input.client_id, item_count = input.items.len()))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<OrderResponse, ServiceError> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }

        // Quote every line against the current catalogs before touching
        // storage, so a rejected add-on aborts the whole submission.
        let selections: Vec<LineSelection> = input
            .items
            .iter()
            .map(|item| LineSelection {
                service_id: item.service_id,
                complexity_id: item.complexity_id,
                addon_ids: item.addon_ids.clone(),
            })
            .collect();
        let estimate = self.estimation.quote(&selections).await?;

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let status = if input.items.is_empty() {
            OrderStatus::Draft
        } else {
            OrderStatus::Estimated
        };

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let order_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(Self::new_order_number()),
            client_id: Set(input.client_id),
            status: Set(status.to_string()),
            estimated_price_cents: Set(estimate.total_cents),
            estimated_days: Set(estimate.total_days),
            final_price_cents: Set(None),
            final_days: Set(None),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        for (item, line) in input.items.iter().zip(estimate.lines.iter()) {
            let item_id = Uuid::new_v4();
            order_item::ActiveModel {
                id: Set(item_id),
                order_id: Set(order_id),
                kit_name: Set(item.kit_name.clone()),
                kit_grade: Set(item.kit_grade.clone()),
                service_id: Set(item.service_id),
                complexity_id: Set(item.complexity_id),
                notes: Set(item.notes.clone()),
                subtotal_cents: Set(line.subtotal_cents),
                addon_total_cents: Set(line.addon_total_cents),
                total_cents: Set(line.total_cents),
                duration_days: Set(line.duration_days),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;

            // The materialized selection includes required add-ons the
            // client never ticked; each gets a price snapshot.
            for addon_id in &line.addon_ids {
                let price_cents = self
                    .addon_price_snapshot(&txn, *addon_id)
                    .await?;
                order_item_addon::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_item_id: Set(item_id),
                    addon_id: Set(*addon_id),
                    price_cents: Set(price_cents),
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, total_cents = estimate.total_cents, "Order created");
        self.emit(Event::OrderCreated(order_id)).await;
        self.model_to_response(order_model)
    }

    async fn addon_price_snapshot<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        addon_id: Uuid,
    ) -> Result<i64, ServiceError> {
        let addon = crate::entities::service_addon::Entity::find_by_id(addon_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Add-on {} not found", addon_id)))?;
        Ok(addon.price_cents)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderResponse>, ServiceError> {
        let order = OrderEntity::find_by_id(order_id).one(&*self.db).await?;
        order.map(|model| self.model_to_response(model)).transpose()
    }

    /// Items of an order, each with its materialized add-on references.
    #[instrument(skip(self))]
    pub async fn get_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemResponse>, ServiceError> {
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let item_ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let mut addons_by_item: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        if !item_ids.is_empty() {
            let rows = OrderItemAddonEntity::find()
                .filter(order_item_addon::Column::OrderItemId.is_in(item_ids))
                .all(&*self.db)
                .await?;
            for row in rows {
                addons_by_item
                    .entry(row.order_item_id)
                    .or_default()
                    .push(row.addon_id);
            }
        }

        Ok(items
            .into_iter()
            .map(|item| {
                let addon_ids = addons_by_item.remove(&item.id).unwrap_or_default();
                OrderItemResponse {
                    id: item.id,
                    order_id: item.order_id,
                    kit_name: item.kit_name,
                    kit_grade: item.kit_grade,
                    service_id: item.service_id,
                    complexity_id: item.complexity_id,
                    notes: item.notes,
                    subtotal_cents: item.subtotal_cents,
                    addon_total_cents: item.addon_total_cents,
                    total_cents: item.total_cents,
                    duration_days: item.duration_days,
                    addon_ids,
                }
            })
            .collect())
    }

    /// Lists orders with pagination, optionally filtered by status and owner.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        status: Option<OrderStatus>,
        client_id: Option<Uuid>,
    ) -> Result<OrderListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }
        if let Some(client_id) = client_id {
            query = query.filter(order::Column::ClientId.eq(client_id));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        let responses: Vec<OrderResponse> = orders
            .into_iter()
            .map(|model| self.model_to_response(model))
            .collect::<Result<_, _>>()?;

        Ok(OrderListResponse {
            orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// All orders visible to the caller, for the board and calendar
    /// projections (no pagination; projections need the full set).
    #[instrument(skip(self))]
    pub async fn list_for_projection(
        &self,
        client_id: Option<Uuid>,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let mut query = OrderEntity::find().order_by_asc(order::Column::CreatedAt);
        if let Some(client_id) = client_id {
            query = query.filter(order::Column::ClientId.eq(client_id));
        }
        query
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|model| self.model_to_response(model))
            .collect()
    }

    /// Applies a validated workflow transition.
    ///
    /// The caller may pass the version its view was rendered from; a
    /// mismatch means someone else moved the order first and the mutation is
    /// rejected so the stale view can revert.
    #[instrument(skip(self), fields(order_id = %order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        expected_version: Option<i32>,
    ) -> Result<StatusChange, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to begin transaction for status update");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = OrderStatus::from_str(&order.status)
            .map_err(|_| ServiceError::InternalError(format!("Order {} has unknown status", order_id)))?;

        if let Some(expected) = expected_version {
            if expected != order.version {
                warn!(
                    order_id = %order_id,
                    expected,
                    actual = order.version,
                    "Stale status update rejected"
                );
                return Err(ServiceError::ConcurrentModification(order_id));
            }
        }

        if old_status == new_status {
            // No-op transition: acknowledge without mutating.
            let response = self.model_to_response(order)?;
            return Ok(StatusChange {
                old_status,
                new_status,
                order: response,
            });
        }

        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot transition from '{}' to '{}'",
                old_status, new_status
            )));
        }

        let version = order.version;
        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit status update");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            "Order status updated"
        );
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
        })
        .await;
        match new_status {
            OrderStatus::Cancelled => self.emit(Event::OrderCancelled(order_id)).await,
            OrderStatus::Completed => self.emit(Event::OrderCompleted(order_id)).await,
            _ => {}
        }

        Ok(StatusChange {
            old_status,
            new_status,
            order: self.model_to_response(updated)?,
        })
    }

    /// Records the settled price and duration of a completed build.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn set_final(
        &self,
        order_id: Uuid,
        final_price_cents: i64,
        final_days: i32,
    ) -> Result<OrderResponse, ServiceError> {
        if final_price_cents < 0 || final_days < 0 {
            return Err(ServiceError::ValidationError(
                "Final price and duration must not be negative".to_string(),
            ));
        }

        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let status = OrderStatus::from_str(&order.status)
            .map_err(|_| ServiceError::InternalError(format!("Order {} has unknown status", order_id)))?;
        if status != OrderStatus::Completed {
            return Err(ServiceError::InvalidOperation(
                "Final price can only be set on completed orders".to_string(),
            ));
        }

        let version = order.version;
        let mut active: OrderActiveModel = order.into();
        active.final_price_cents = Set(Some(final_price_cents));
        active.final_days = Set(Some(final_days));
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);
        let updated = active.update(&*self.db).await?;

        self.emit(Event::OrderFinalized {
            order_id,
            final_price_cents,
            final_days,
        })
        .await;
        self.model_to_response(updated)
    }
}
