use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-service multiplier override for one complexity tier.
///
/// A row exists only while an override is in force; clearing the override
/// deletes the row and the tier's default multiplier applies again.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_complexities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub complexity_id: Uuid,
    pub override_multiplier: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_type::Entity",
        from = "Column::ServiceId",
        to = "super::service_type::Column::Id"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::complexity_level::Entity",
        from = "Column::ComplexityId",
        to = "super::complexity_level::Column::Id"
    )]
    Complexity,
}

impl Related<super::service_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::complexity_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complexity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
