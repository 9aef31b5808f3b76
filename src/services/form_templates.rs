use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::form_template::{self, Entity as FormTemplateEntity, Model as FormTemplateModel},
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateFormTemplate {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Intake form field definitions, stored verbatim for the front end.
    pub fields: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateFormTemplate {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub fields: Option<serde_json::Value>,
    pub active: Option<bool>,
}

/// Admin-configured intake form layouts.
#[derive(Clone)]
pub struct FormTemplateService {
    db: Arc<DbPool>,
}

impl FormTemplateService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<FormTemplateModel>, ServiceError> {
        let mut query = FormTemplateEntity::find().order_by_asc(form_template::Column::CreatedAt);
        if !include_inactive {
            query = query.filter(form_template::Column::Active.eq(true));
        }
        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<FormTemplateModel, ServiceError> {
        FormTemplateEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Form template {} not found", id)))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateFormTemplate,
    ) -> Result<FormTemplateModel, ServiceError> {
        request.validate()?;
        let model = form_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            fields: Set(request.fields),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;
        info!(template_id = %model.id, "Form template created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateFormTemplate,
    ) -> Result<FormTemplateModel, ServiceError> {
        request.validate()?;
        let existing = self.get(id).await?;
        let mut active: form_template::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(fields) = request.fields {
            active.fields = Set(fields);
        }
        if let Some(is_active) = request.active {
            active.active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get(id).await?;
        FormTemplateEntity::delete_by_id(id).exec(&*self.db).await?;
        Ok(())
    }
}
