use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A bookable build service (e.g. straight build, full custom paint).
///
/// `base_price_cents` and `base_days` are the pre-multiplier baseline the
/// estimation engine scales by a complexity multiplier.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "service_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Base price must not be negative"))]
    pub base_price_cents: i64,

    #[validate(range(min = 0, message = "Base days must not be negative"))]
    pub base_days: i32,

    pub icon: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_addon::Entity")]
    Addons,
    #[sea_orm(has_many = "super::service_complexity::Entity")]
    ComplexityOverrides,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::service_addon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Addons.def()
    }
}

impl Related<super::service_complexity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComplexityOverrides.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
