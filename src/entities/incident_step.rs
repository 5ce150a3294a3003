use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One step of the incident-analysis wizard. Steps are numbered 1..=N and
/// must be completed in order; payload shape differs per step and is kept
/// as a JSON document.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "incident_steps")]
#[schema(as = IncidentStep)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub incident_id: Uuid,
    pub step_number: i32,
    #[sea_orm(column_type = "Json")]
    pub payload: Json,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::incident_report::Entity",
        from = "Column::IncidentId",
        to = "super::incident_report::Column::Id",
        on_delete = "Cascade"
    )]
    Incident,
}

impl Related<super::incident_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incident.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
