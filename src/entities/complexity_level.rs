use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global difficulty tier with its default price/time multiplier.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complexity_levels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub multiplier: Decimal,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_complexity::Entity")]
    ServiceOverrides,
}

impl Related<super::service_complexity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOverrides.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
