use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One kit inside an order, frozen at submission time.
///
/// The money/duration columns are the estimation snapshot for this line;
/// they are never recomputed after insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
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
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
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
    #[sea_orm(has_many = "super::order_item_addon::Entity")]
    SelectedAddons,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
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

impl Related<super::order_item_addon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SelectedAddons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
