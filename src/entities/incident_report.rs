use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use strum::Display;

/// EHS incident report. Analysis detail lives in the ordered step records;
/// the report can only be submitted once every step is complete.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "incident_reports")]
#[schema(as = IncidentReport)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub worksite_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
    pub severity: IncidentSeverity,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: IncidentStatus,
    pub reported_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incident_step::Entity")]
    Steps,
}

impl Related<super::incident_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Steps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Display, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Display, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl IncidentStatus {
    pub fn can_transition_to(self, next: IncidentStatus) -> bool {
        use IncidentStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, UnderReview) | (UnderReview, Closed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::IncidentStatus::*;

    #[test]
    fn review_flow_is_strictly_forward() {
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Closed));

        assert!(!Draft.can_transition_to(UnderReview));
        assert!(!Submitted.can_transition_to(Draft));
        assert!(!Closed.can_transition_to(UnderReview));
    }
}
