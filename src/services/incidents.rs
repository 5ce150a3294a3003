use crate::{
    entities::{
        incident_report::{self, IncidentSeverity, IncidentStatus},
        incident_step, IncidentReport, IncidentReportModel, IncidentStep, IncidentStepModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Number of analysis steps in the incident wizard.
pub const INCIDENT_STEP_COUNT: i32 = 5;

/// EHS incident service.
///
/// A report starts as a draft, collects its five analysis steps in
/// order, and is then submitted for review. Review moves it through
/// UnderReview to Closed; nothing is editable after submission.
#[derive(Clone)]
pub struct IncidentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl IncidentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create_incident(
        &self,
        tenant_id: Uuid,
        reported_by: Uuid,
        input: CreateIncidentInput,
    ) -> Result<IncidentReportModel, ServiceError> {
        let now = Utc::now();
        let model = incident_report::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            worksite_id: Set(input.worksite_id),
            occurred_at: Set(input.occurred_at),
            severity: Set(input.severity),
            description: Set(input.description),
            status: Set(IncidentStatus::Draft),
            reported_by: Set(reported_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::IncidentReported(created.id))
            .await;

        info!("Created incident report: {}", created.id);
        Ok(created)
    }

    /// Update report fields. Only drafts are editable.
    #[instrument(skip(self))]
    pub async fn update_incident(
        &self,
        incident_id: Uuid,
        tenant: Option<Uuid>,
        input: UpdateIncidentInput,
    ) -> Result<IncidentReportModel, ServiceError> {
        let incident = find_scoped_incident(&*self.db, incident_id, tenant).await?;
        ensure_draft(&incident)?;

        let mut model: incident_report::ActiveModel = incident.into();
        if let Some(worksite_id) = input.worksite_id {
            model.worksite_id = Set(Some(worksite_id));
        }
        if let Some(occurred_at) = input.occurred_at {
            model.occurred_at = Set(occurred_at);
        }
        if let Some(severity) = input.severity {
            model.severity = Set(severity);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    /// Save analysis step N. Steps must be completed in order, so saving
    /// step N requires steps 1..N-1 to be complete already.
    #[instrument(skip(self))]
    pub async fn upsert_step(
        &self,
        incident_id: Uuid,
        tenant: Option<Uuid>,
        input: UpsertStepInput,
    ) -> Result<IncidentStepModel, ServiceError> {
        if input.step_number < 1 || input.step_number > INCIDENT_STEP_COUNT {
            return Err(ServiceError::ValidationError(format!(
                "Step number must be within 1..={}, got {}",
                INCIDENT_STEP_COUNT, input.step_number
            )));
        }

        let txn = self.db.begin().await?;

        let incident = find_scoped_incident(&txn, incident_id, tenant).await?;
        ensure_draft(&incident)?;

        let steps = IncidentStep::find()
            .filter(incident_step::Column::IncidentId.eq(incident_id))
            .all(&txn)
            .await?;

        for required in 1..input.step_number {
            let done = steps
                .iter()
                .any(|s| s.step_number == required && s.completed_at.is_some());
            if !done {
                return Err(ServiceError::InvalidOperation(format!(
                    "Step {} cannot be saved before step {} is complete",
                    input.step_number, required
                )));
            }
        }

        let now = Utc::now();
        let existing = steps
            .into_iter()
            .find(|s| s.step_number == input.step_number);

        let step = if let Some(step) = existing {
            let mut model: incident_step::ActiveModel = step.into();
            model.payload = Set(input.payload);
            model.completed_at = Set(Some(now));
            model.updated_at = Set(now);
            model.update(&txn).await?
        } else {
            let model = incident_step::ActiveModel {
                id: Set(Uuid::new_v4()),
                incident_id: Set(incident_id),
                step_number: Set(input.step_number),
                payload: Set(input.payload),
                completed_at: Set(Some(now)),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model.insert(&txn).await?
        };

        txn.commit().await?;
        Ok(step)
    }

    /// Submit a complete draft for review.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        incident_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<IncidentReportModel, ServiceError> {
        let txn = self.db.begin().await?;

        let incident = find_scoped_incident(&txn, incident_id, tenant).await?;
        ensure_draft(&incident)?;

        let steps = IncidentStep::find()
            .filter(incident_step::Column::IncidentId.eq(incident_id))
            .all(&txn)
            .await?;
        for required in 1..=INCIDENT_STEP_COUNT {
            let done = steps
                .iter()
                .any(|s| s.step_number == required && s.completed_at.is_some());
            if !done {
                return Err(ServiceError::InvalidOperation(format!(
                    "Cannot submit: step {} is not complete",
                    required
                )));
            }
        }

        let mut model: incident_report::ActiveModel = incident.into();
        model.status = Set(IncidentStatus::Submitted);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::IncidentSubmitted(incident_id))
            .await;

        info!("Incident submitted: {}", incident_id);
        Ok(updated)
    }

    /// Review transitions: Submitted to UnderReview, UnderReview to
    /// Closed. Anything else is rejected.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        incident_id: Uuid,
        new_status: IncidentStatus,
    ) -> Result<IncidentReportModel, ServiceError> {
        let incident = find_scoped_incident(&*self.db, incident_id, None).await?;

        let old_status = incident.status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Incident {} cannot move from {} to {}",
                incident_id, old_status, new_status
            )));
        }

        let mut model: incident_report::ActiveModel = incident.into();
        model.status = Set(new_status);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::IncidentStatusChanged {
                incident_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn list_incidents(
        &self,
        tenant: Option<Uuid>,
        status: Option<IncidentStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<IncidentReportModel>, u64), ServiceError> {
        let mut query = IncidentReport::find();
        if let Some(tenant_id) = tenant {
            query = query.filter(incident_report::Column::TenantId.eq(tenant_id));
        }
        if let Some(status) = status {
            query = query.filter(incident_report::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(incident_report::Column::OccurredAt)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let incidents = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((incidents, total))
    }

    #[instrument(skip(self))]
    pub async fn get_incident(
        &self,
        incident_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<IncidentDetail, ServiceError> {
        let incident = find_scoped_incident(&*self.db, incident_id, tenant).await?;
        let steps = IncidentStep::find()
            .filter(incident_step::Column::IncidentId.eq(incident_id))
            .order_by_asc(incident_step::Column::StepNumber)
            .all(&*self.db)
            .await?;
        Ok(IncidentDetail { incident, steps })
    }
}

fn ensure_draft(incident: &IncidentReportModel) -> Result<(), ServiceError> {
    if incident.status != IncidentStatus::Draft {
        return Err(ServiceError::InvalidOperation(format!(
            "Incident {} is no longer editable (status {})",
            incident.id, incident.status
        )));
    }
    Ok(())
}

async fn find_scoped_incident<C: ConnectionTrait>(
    conn: &C,
    incident_id: Uuid,
    tenant: Option<Uuid>,
) -> Result<IncidentReportModel, ServiceError> {
    let incident = IncidentReport::find_by_id(incident_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Incident {} not found", incident_id)))?;
    if let Some(tenant_id) = tenant {
        if incident.tenant_id != tenant_id {
            return Err(ServiceError::NotFound(format!(
                "Incident {} not found",
                incident_id
            )));
        }
    }
    Ok(incident)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIncidentInput {
    pub worksite_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
    pub severity: IncidentSeverity,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateIncidentInput {
    pub worksite_id: Option<Uuid>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub severity: Option<IncidentSeverity>,
    #[validate(length(min = 1, max = 10000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertStepInput {
    #[validate(range(min = 1, max = 5))]
    pub step_number: i32,
    pub payload: serde_json::Value,
}

/// A report with its analysis steps.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IncidentDetail {
    pub incident: IncidentReportModel,
    pub steps: Vec<IncidentStepModel>,
}
