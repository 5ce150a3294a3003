use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// PPE catalog item. Pricing and lead times live in quantity-tier child
/// tables; `use_life_months` drives the equipment expiration computation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[schema(as = Product)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String,
    pub brand: String,
    /// Rated use-life in months once assigned to an employee
    pub use_life_months: i32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::price_tier::Entity")]
    PriceTiers,
    #[sea_orm(has_many = "super::lead_time_tier::Entity")]
    LeadTimeTiers,
    #[sea_orm(has_many = "super::inventory_batch::Entity")]
    InventoryBatches,
}

impl Related<super::price_tier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceTiers.def()
    }
}

impl Related<super::lead_time_tier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadTimeTiers.def()
    }
}

impl Related<super::inventory_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Product status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "archived")]
    Archived,
}
