use crate::{
    entities::{
        assignment, employee, inventory_batch, Assignment, AssignmentModel, Employee,
        InventoryBatch, Product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::lifecycle::{expiration_date, remaining_life_days, renewal_date},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Equipment lifecycle service.
///
/// Assignment hands one unit from each named batch to an employee.
/// The availability checks, the assignment records and both counters are
/// committed in a single transaction, so two concurrent requests can
/// never both take the last unit of a batch and a failed check leaves
/// nothing half-applied.
#[derive(Clone)]
pub struct EquipmentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl EquipmentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Assign one unit from each batch to the employee.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        tenant: Option<Uuid>,
        employee_id: Uuid,
        input: AssignEquipmentInput,
    ) -> Result<Vec<AssignmentModel>, ServiceError> {
        if input.batch_ids.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one batch is required".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let employee = Employee::find_by_id(employee_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", employee_id))
            })?;
        if let Some(tenant_id) = tenant {
            if employee.tenant_id != tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Employee {} not found",
                    employee_id
                )));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(input.batch_ids.len());

        for batch_id in &input.batch_ids {
            let batch = InventoryBatch::find_by_id(*batch_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Batch {} not found", batch_id))
                })?;
            if batch.tenant_id != employee.tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Batch {} not found",
                    batch_id
                )));
            }
            if batch.available_quantity < 1 {
                return Err(ServiceError::InsufficientStock(format!(
                    "Batch {} has no available units",
                    batch_id
                )));
            }

            let available = batch.available_quantity - 1;
            let mut batch_model: inventory_batch::ActiveModel = batch.into();
            batch_model.available_quantity = Set(available);
            batch_model.updated_at = Set(now);
            batch_model.update(&txn).await?;

            let record = assignment::ActiveModel {
                id: Set(Uuid::new_v4()),
                batch_id: Set(*batch_id),
                employee_id: Set(employee_id),
                assigned_at: Set(now),
                unassigned_at: Set(None),
            };
            created.push(record.insert(&txn).await?);
        }

        let new_count = employee.assigned_count + created.len() as i32;
        let mut employee_model: employee::ActiveModel = employee.into();
        employee_model.assigned_count = Set(new_count);
        employee_model.updated_at = Set(now);
        employee_model.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::EquipmentAssigned {
                employee_id,
                batch_ids: input.batch_ids,
            })
            .await;

        info!(employee_id = %employee_id, count = created.len(), "equipment assigned");
        Ok(created)
    }

    /// Return an assigned unit to its batch.
    #[instrument(skip(self))]
    pub async fn unassign(
        &self,
        tenant: Option<Uuid>,
        assignment_id: Uuid,
    ) -> Result<AssignmentModel, ServiceError> {
        let txn = self.db.begin().await?;

        let record = Assignment::find_by_id(assignment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Assignment {} not found", assignment_id))
            })?;
        if record.unassigned_at.is_some() {
            return Err(ServiceError::InvalidOperation(format!(
                "Assignment {} is already returned",
                assignment_id
            )));
        }

        let employee = Employee::find_by_id(record.employee_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", record.employee_id))
            })?;
        if let Some(tenant_id) = tenant {
            if employee.tenant_id != tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Assignment {} not found",
                    assignment_id
                )));
            }
        }

        let now = Utc::now();

        let batch = InventoryBatch::find_by_id(record.batch_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Batch {} not found", record.batch_id))
            })?;
        let restored = (batch.available_quantity + 1).min(batch.base_quantity);
        let mut batch_model: inventory_batch::ActiveModel = batch.into();
        batch_model.available_quantity = Set(restored);
        batch_model.updated_at = Set(now);
        batch_model.update(&txn).await?;

        let employee_id = employee.id;
        let new_count = (employee.assigned_count - 1).max(0);
        let mut employee_model: employee::ActiveModel = employee.into();
        employee_model.assigned_count = Set(new_count);
        employee_model.updated_at = Set(now);
        employee_model.update(&txn).await?;

        let mut record_model: assignment::ActiveModel = record.into();
        record_model.unassigned_at = Set(Some(now));
        let updated = record_model.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::EquipmentReturned {
                employee_id,
                assignment_id,
            })
            .await;

        Ok(updated)
    }

    /// The employee's active equipment with computed use-life dates.
    #[instrument(skip(self))]
    pub async fn employee_equipment(
        &self,
        tenant: Option<Uuid>,
        employee_id: Uuid,
    ) -> Result<Vec<EquipmentView>, ServiceError> {
        let employee = Employee::find_by_id(employee_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", employee_id))
            })?;
        if let Some(tenant_id) = tenant {
            if employee.tenant_id != tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Employee {} not found",
                    employee_id
                )));
            }
        }

        let records = Assignment::find()
            .filter(assignment::Column::EmployeeId.eq(employee_id))
            .filter(assignment::Column::UnassignedAt.is_null())
            .order_by_asc(assignment::Column::AssignedAt)
            .all(&*self.db)
            .await?;

        let now = Utc::now();
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let batch = InventoryBatch::find_by_id(record.batch_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Batch {} not found", record.batch_id))
                })?;
            let product = Product::find_by_id(batch.product_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", batch.product_id))
                })?;

            let expiration = expiration_date(record.assigned_at, product.use_life_months)?;
            views.push(EquipmentView {
                assignment_id: record.id,
                batch_id: batch.id,
                product_id: product.id,
                product_name: product.name,
                color: batch.color,
                size: batch.size,
                assigned_at: record.assigned_at,
                expiration_date: expiration,
                renewal_date: renewal_date(expiration)?,
                remaining_life_days: remaining_life_days(expiration, now),
            });
        }

        Ok(views)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignEquipmentInput {
    #[validate(length(min = 1))]
    pub batch_ids: Vec<Uuid>,
}

/// One actively assigned piece of equipment with its use-life dates.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentView {
    pub assignment_id: Uuid,
    pub batch_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub color: String,
    pub size: String,
    pub assigned_at: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
    pub remaining_life_days: i64,
}
