use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use strum::Display;

/// Application account. Contractors own a tenant (their own id); principal
/// employers are linked read-only to a contractor tenant; admin and
/// warehouse accounts carry no tenant and bypass tenant scoping.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "users")]
#[schema(as = User)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Display, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "contractor")]
    Contractor,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "warehouse")]
    Warehouse,
    #[sea_orm(string_value = "principal")]
    Principal,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Contractor => "contractor",
            UserRole::Admin => "admin",
            UserRole::Warehouse => "warehouse",
            UserRole::Principal => "principal",
        }
    }
}
