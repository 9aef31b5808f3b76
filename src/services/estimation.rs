use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        complexity_level::{self, Entity as ComplexityLevelEntity},
        service_addon::{self, Entity as ServiceAddonEntity},
        service_complexity::{self, Entity as ServiceComplexityEntity},
        service_type::{self, Entity as ServiceTypeEntity},
    },
    errors::ServiceError,
    estimation::{estimate_line, estimate_order, LineEstimate, OrderEstimate},
};

/// One requested line: a service, a complexity tier, and chosen add-ons.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineSelection {
    pub service_id: Uuid,
    pub complexity_id: Uuid,
    #[serde(default)]
    pub addon_ids: Vec<Uuid>,
}

/// Loads catalog rows and runs the pure estimation engine over them.
#[derive(Clone)]
pub struct EstimationService {
    db: Arc<DbPool>,
}

impl EstimationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Quotes a whole order without persisting anything.
    #[instrument(skip(self, selections), fields(line_count = selections.len()))]
    pub async fn quote(&self, selections: &[LineSelection]) -> Result<OrderEstimate, ServiceError> {
        let mut lines = Vec::with_capacity(selections.len());
        for selection in selections {
            lines.push(self.quote_line(selection).await?);
        }
        Ok(estimate_order(lines))
    }

    /// Quotes a single line against the current catalogs.
    #[instrument(skip(self, selection), fields(service_id = %selection.service_id))]
    pub async fn quote_line(&self, selection: &LineSelection) -> Result<LineEstimate, ServiceError> {
        // The service and complexity catalogs are independent; fetch them
        // concurrently and join client-side.
        let (service, complexity) = tokio::try_join!(
            self.fetch_active_service(selection.service_id),
            self.fetch_active_complexity(selection.complexity_id),
        )?;
        let (override_multiplier, addons) = tokio::try_join!(
            self.fetch_override(selection.service_id, selection.complexity_id),
            self.fetch_addons(selection.service_id),
        )?;

        estimate_line(
            &service,
            &complexity,
            override_multiplier,
            &addons,
            &selection.addon_ids,
        )
    }

    async fn fetch_active_service(&self, id: Uuid) -> Result<service_type::Model, ServiceError> {
        let service = ServiceTypeEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Service {} not found", id)))?;
        if !service.active {
            return Err(ServiceError::ValidationError(format!(
                "Service '{}' is not currently offered",
                service.name
            )));
        }
        Ok(service)
    }

    async fn fetch_active_complexity(
        &self,
        id: Uuid,
    ) -> Result<complexity_level::Model, ServiceError> {
        let complexity = ComplexityLevelEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Complexity level {} not found", id)))?;
        if !complexity.active {
            return Err(ServiceError::ValidationError(format!(
                "Complexity level '{}' is not currently offered",
                complexity.name
            )));
        }
        Ok(complexity)
    }

    /// Override multiplier for (service, complexity), when one is configured.
    /// A missing row means the tier's global default applies.
    async fn fetch_override(
        &self,
        service_id: Uuid,
        complexity_id: Uuid,
    ) -> Result<Option<Decimal>, ServiceError> {
        let row = ServiceComplexityEntity::find()
            .filter(service_complexity::Column::ServiceId.eq(service_id))
            .filter(service_complexity::Column::ComplexityId.eq(complexity_id))
            .one(&*self.db)
            .await?;
        Ok(row.map(|r| r.override_multiplier))
    }

    async fn fetch_addons(
        &self,
        service_id: Uuid,
    ) -> Result<Vec<service_addon::Model>, ServiceError> {
        let addons = ServiceAddonEntity::find()
            .filter(service_addon::Column::ServiceId.eq(service_id))
            .all(&*self.db)
            .await?;
        Ok(addons)
    }
}
