use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        complexity_level::{self, Entity as ComplexityLevelEntity},
        order_item::{self, Entity as OrderItemEntity},
        order_item_addon::{self, Entity as OrderItemAddonEntity},
        service_addon::{self, Entity as ServiceAddonEntity},
        service_complexity::{self, Entity as ServiceComplexityEntity},
        service_type::{self, Entity as ServiceTypeEntity},
    },
    errors::ServiceError,
};

/// Request/response types for catalog administration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateServiceType {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Base price must not be negative"))]
    pub base_price_cents: i64,
    #[validate(range(min = 0, message = "Base days must not be negative"))]
    pub base_days: i32,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateServiceType {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Base price must not be negative"))]
    pub base_price_cents: Option<i64>,
    #[validate(range(min = 0, message = "Base days must not be negative"))]
    pub base_days: Option<i32>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateComplexityLevel {
    #[validate(length(min = 1, max = 50, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Slug is required"))]
    pub slug: String,
    pub multiplier: Decimal,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateComplexityLevel {
    #[validate(length(min = 1, max = 50, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub multiplier: Option<Decimal>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAddon {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: i64,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateAddon {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price_cents: Option<i64>,
    pub required: Option<bool>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

/// Outcome of a delete request for a catalog entity.
///
/// Entities referenced by persisted orders are deactivated instead of
/// removed so historical estimates keep resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    Deactivated,
}

fn require_positive_multiplier(multiplier: Decimal) -> Result<(), ServiceError> {
    if multiplier <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Multiplier must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Admin-facing CRUD over the service, complexity and add-on catalogs.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    // ---- service types ----

    #[instrument(skip(self))]
    pub async fn list_services(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<service_type::Model>, ServiceError> {
        let mut query = ServiceTypeEntity::find().order_by_asc(service_type::Column::SortOrder);
        if !include_inactive {
            query = query.filter(service_type::Column::Active.eq(true));
        }
        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_service(&self, id: Uuid) -> Result<service_type::Model, ServiceError> {
        ServiceTypeEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Service {} not found", id)))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_service(
        &self,
        request: CreateServiceType,
    ) -> Result<service_type::Model, ServiceError> {
        request.validate()?;
        let model = service_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            base_price_cents: Set(request.base_price_cents),
            base_days: Set(request.base_days),
            icon: Set(request.icon),
            sort_order: Set(request.sort_order),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;
        info!(service_id = %model.id, "Service created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_service(
        &self,
        id: Uuid,
        request: UpdateServiceType,
    ) -> Result<service_type::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_service(id).await?;
        let mut active: service_type::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(base_price_cents) = request.base_price_cents {
            active.base_price_cents = Set(base_price_cents);
        }
        if let Some(base_days) = request.base_days {
            active.base_days = Set(base_days);
        }
        if let Some(icon) = request.icon {
            active.icon = Set(Some(icon));
        }
        if let Some(sort_order) = request.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(is_active) = request.active {
            active.active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }

    /// Deletes a service, or deactivates it when order lines reference it.
    #[instrument(skip(self))]
    pub async fn delete_service(&self, id: Uuid) -> Result<DeleteOutcome, ServiceError> {
        let existing = self.get_service(id).await?;
        let referenced = OrderItemEntity::find()
            .filter(order_item::Column::ServiceId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            let mut active: service_type::ActiveModel = existing.into();
            active.active = Set(false);
            active.updated_at = Set(Some(Utc::now()));
            active.update(&*self.db).await?;
            info!(service_id = %id, referenced, "Service deactivated instead of deleted");
            return Ok(DeleteOutcome::Deactivated);
        }

        ServiceAddonEntity::delete_many()
            .filter(service_addon::Column::ServiceId.eq(id))
            .exec(&*self.db)
            .await?;
        ServiceComplexityEntity::delete_many()
            .filter(service_complexity::Column::ServiceId.eq(id))
            .exec(&*self.db)
            .await?;
        ServiceTypeEntity::delete_by_id(id).exec(&*self.db).await?;
        info!(service_id = %id, "Service deleted");
        Ok(DeleteOutcome::Deleted)
    }

    // ---- complexity levels ----

    #[instrument(skip(self))]
    pub async fn list_complexity_levels(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<complexity_level::Model>, ServiceError> {
        let mut query =
            ComplexityLevelEntity::find().order_by_asc(complexity_level::Column::SortOrder);
        if !include_inactive {
            query = query.filter(complexity_level::Column::Active.eq(true));
        }
        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_complexity_level(
        &self,
        id: Uuid,
    ) -> Result<complexity_level::Model, ServiceError> {
        ComplexityLevelEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Complexity level {} not found", id)))
    }

    #[instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn create_complexity_level(
        &self,
        request: CreateComplexityLevel,
    ) -> Result<complexity_level::Model, ServiceError> {
        request.validate()?;
        require_positive_multiplier(request.multiplier)?;

        let duplicate = ComplexityLevelEntity::find()
            .filter(complexity_level::Column::Slug.eq(request.slug.clone()))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Complexity level with slug '{}' already exists",
                request.slug
            )));
        }

        let model = complexity_level::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            slug: Set(request.slug),
            multiplier: Set(request.multiplier),
            sort_order: Set(request.sort_order),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;
        info!(complexity_id = %model.id, "Complexity level created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_complexity_level(
        &self,
        id: Uuid,
        request: UpdateComplexityLevel,
    ) -> Result<complexity_level::Model, ServiceError> {
        request.validate()?;
        if let Some(multiplier) = request.multiplier {
            require_positive_multiplier(multiplier)?;
        }
        let existing = self.get_complexity_level(id).await?;
        let mut active: complexity_level::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(multiplier) = request.multiplier {
            active.multiplier = Set(multiplier);
        }
        if let Some(sort_order) = request.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(is_active) = request.active {
            active.active = Set(is_active);
        }
        Ok(active.update(&*self.db).await?)
    }

    /// Deletes a complexity level, or deactivates it when order lines
    /// reference it.
    #[instrument(skip(self))]
    pub async fn delete_complexity_level(&self, id: Uuid) -> Result<DeleteOutcome, ServiceError> {
        let existing = self.get_complexity_level(id).await?;
        let referenced = OrderItemEntity::find()
            .filter(order_item::Column::ComplexityId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            let mut active: complexity_level::ActiveModel = existing.into();
            active.active = Set(false);
            active.update(&*self.db).await?;
            return Ok(DeleteOutcome::Deactivated);
        }

        ServiceComplexityEntity::delete_many()
            .filter(service_complexity::Column::ComplexityId.eq(id))
            .exec(&*self.db)
            .await?;
        ComplexityLevelEntity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(DeleteOutcome::Deleted)
    }

    // ---- per-service complexity overrides ----

    #[instrument(skip(self))]
    pub async fn list_overrides(
        &self,
        service_id: Uuid,
    ) -> Result<Vec<service_complexity::Model>, ServiceError> {
        self.get_service(service_id).await?;
        Ok(ServiceComplexityEntity::find()
            .filter(service_complexity::Column::ServiceId.eq(service_id))
            .all(&*self.db)
            .await?)
    }

    /// Sets or clears the multiplier override for a (service, complexity)
    /// pair. `None` removes the override so the tier default applies again.
    #[instrument(skip(self))]
    pub async fn set_override(
        &self,
        service_id: Uuid,
        complexity_id: Uuid,
        multiplier: Option<Decimal>,
    ) -> Result<Option<service_complexity::Model>, ServiceError> {
        self.get_service(service_id).await?;
        self.get_complexity_level(complexity_id).await?;

        let existing = ServiceComplexityEntity::find()
            .filter(service_complexity::Column::ServiceId.eq(service_id))
            .filter(service_complexity::Column::ComplexityId.eq(complexity_id))
            .one(&*self.db)
            .await?;

        match multiplier {
            Some(value) => {
                require_positive_multiplier(value)?;
                match existing {
                    Some(row) => {
                        let mut active: service_complexity::ActiveModel = row.into();
                        active.override_multiplier = Set(value);
                        Ok(Some(active.update(&*self.db).await?))
                    }
                    None => {
                        let model = service_complexity::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            service_id: Set(service_id),
                            complexity_id: Set(complexity_id),
                            override_multiplier: Set(value),
                        }
                        .insert(&*self.db)
                        .await?;
                        Ok(Some(model))
                    }
                }
            }
            None => {
                if let Some(row) = existing {
                    ServiceComplexityEntity::delete_by_id(row.id)
                        .exec(&*self.db)
                        .await?;
                }
                Ok(None)
            }
        }
    }

    // ---- add-ons ----

    #[instrument(skip(self))]
    pub async fn list_addons(
        &self,
        service_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<service_addon::Model>, ServiceError> {
        self.get_service(service_id).await?;
        let mut query = ServiceAddonEntity::find()
            .filter(service_addon::Column::ServiceId.eq(service_id))
            .order_by_asc(service_addon::Column::SortOrder);
        if !include_inactive {
            query = query.filter(service_addon::Column::Active.eq(true));
        }
        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_addon(&self, id: Uuid) -> Result<service_addon::Model, ServiceError> {
        ServiceAddonEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Add-on {} not found", id)))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_addon(
        &self,
        service_id: Uuid,
        request: CreateAddon,
    ) -> Result<service_addon::Model, ServiceError> {
        request.validate()?;
        self.get_service(service_id).await?;
        let model = service_addon::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(service_id),
            name: Set(request.name),
            price_cents: Set(request.price_cents),
            required: Set(request.required),
            sort_order: Set(request.sort_order),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;
        info!(addon_id = %model.id, service_id = %service_id, "Add-on created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_addon(
        &self,
        id: Uuid,
        request: UpdateAddon,
    ) -> Result<service_addon::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_addon(id).await?;
        let mut active: service_addon::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(price_cents) = request.price_cents {
            active.price_cents = Set(price_cents);
        }
        if let Some(required) = request.required {
            active.required = Set(required);
        }
        if let Some(sort_order) = request.sort_order {
            active.sort_order = Set(sort_order);
        }
        if let Some(is_active) = request.active {
            active.active = Set(is_active);
        }
        Ok(active.update(&*self.db).await?)
    }

    /// Deletes an add-on, or deactivates it when order lines reference it.
    #[instrument(skip(self))]
    pub async fn delete_addon(&self, id: Uuid) -> Result<DeleteOutcome, ServiceError> {
        let existing = self.get_addon(id).await?;
        let referenced = OrderItemAddonEntity::find()
            .filter(order_item_addon::Column::AddonId.eq(id))
            .count(&*self.db)
            .await?;
        if referenced > 0 {
            let mut active: service_addon::ActiveModel = existing.into();
            active.active = Set(false);
            active.update(&*self.db).await?;
            return Ok(DeleteOutcome::Deactivated);
        }
        ServiceAddonEntity::delete_by_id(id).exec(&*self.db).await?;
        Ok(DeleteOutcome::Deleted)
    }
}
