use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    db::DbPool,
    entities::profile::{self, Entity as ProfileEntity, Model as ProfileModel},
    errors::ServiceError,
    models::Role,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100, message = "Display name must not be empty"))]
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Profiles mirror the identity provider's users; the token is the source of
/// truth for identity, this table adds studio-side bookkeeping.
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DbPool>,
}

impl ProfileService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Fetches the caller's profile, creating it on first contact and
    /// keeping the role in sync with the token.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn ensure_profile(&self, user: &AuthUser) -> Result<ProfileModel, ServiceError> {
        let existing = ProfileEntity::find_by_id(user.user_id)
            .one(&*self.db)
            .await?;

        match existing {
            Some(profile) if profile.role == user.role.to_string() => Ok(profile),
            Some(profile) => {
                let mut active: profile::ActiveModel = profile.into();
                active.role = Set(user.role.to_string());
                active.updated_at = Set(Some(Utc::now()));
                Ok(active.update(&*self.db).await?)
            }
            None => {
                let display_name = user
                    .name
                    .clone()
                    .or_else(|| user.email.clone())
                    .unwrap_or_else(|| "Unnamed".to_string());
                let model = profile::ActiveModel {
                    id: Set(user.user_id),
                    display_name: Set(display_name),
                    email: Set(user.email.clone().unwrap_or_default()),
                    phone: Set(None),
                    role: Set(user.role.to_string()),
                    active: Set(true),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                }
                .insert(&*self.db)
                .await?;
                info!(profile_id = %model.id, "Profile created from token");
                Ok(model)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ProfileModel, ServiceError> {
        ProfileEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, per_page: u64) -> Result<ProfileListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let paginator = ProfileEntity::find()
            .order_by_asc(profile::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let profiles = paginator.fetch_page(page - 1).await?;
        Ok(ProfileListResponse {
            profiles,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateProfile,
    ) -> Result<ProfileModel, ServiceError> {
        request.validate()?;
        let existing = self.get(id).await?;
        let mut active: profile::ActiveModel = existing.into();
        if let Some(display_name) = request.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(role) = request.role {
            active.role = Set(role.to_string());
        }
        if let Some(is_active) = request.active {
            active.active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }
}
