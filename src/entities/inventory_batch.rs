use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A received quantity of one product/color/size, owned by one tenant at
/// one worksite. `base_quantity` is the amount originally received and is
/// immutable; `available_quantity` is decremented as units are assigned.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_batches")]
#[schema(as = InventoryBatch)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub worksite_id: Uuid,
    pub product_id: Uuid,
    pub color: String,
    pub size: String,
    pub base_quantity: i32,
    pub available_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::worksite::Entity",
        from = "Column::WorksiteId",
        to = "super::worksite::Column::Id"
    )]
    Worksite,
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::worksite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worksite.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
