use crate::{
    entities::{
        assignment, employee, inventory_batch, Assignment, Employee, EmployeeModel,
        InventoryBatch, Worksite,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Employee roster service.
///
/// Employees are tenant-scoped and carry a denormalized count of their
/// active equipment assignments. Deleting an employee erases their
/// assignment history and puts still-assigned equipment back into the
/// available pool, all in one transaction.
#[derive(Clone)]
pub struct EmployeeService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl EmployeeService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create_employee(
        &self,
        tenant_id: Uuid,
        input: CreateEmployeeInput,
    ) -> Result<EmployeeModel, ServiceError> {
        if let Some(worksite_id) = input.worksite_id {
            ensure_tenant_worksite(&*self.db, tenant_id, worksite_id).await?;
        }

        let now = Utc::now();
        let model = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            worksite_id: Set(input.worksite_id),
            name: Set(input.name),
            job_title: Set(input.job_title),
            assigned_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::EmployeeCreated(created.id))
            .await;

        info!("Created employee: {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_employees(
        &self,
        tenant: Option<Uuid>,
        worksite_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<EmployeeModel>, u64), ServiceError> {
        let mut query = Employee::find();
        if let Some(tenant_id) = tenant {
            query = query.filter(employee::Column::TenantId.eq(tenant_id));
        }
        if let Some(worksite_id) = worksite_id {
            query = query.filter(employee::Column::WorksiteId.eq(worksite_id));
        }

        let paginator = query
            .order_by_asc(employee::Column::Name)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let employees = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((employees, total))
    }

    #[instrument(skip(self))]
    pub async fn get_employee(
        &self,
        employee_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<EmployeeModel, ServiceError> {
        find_scoped_employee(&*self.db, employee_id, tenant).await
    }

    #[instrument(skip(self))]
    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        tenant: Option<Uuid>,
        input: UpdateEmployeeInput,
    ) -> Result<EmployeeModel, ServiceError> {
        let employee = find_scoped_employee(&*self.db, employee_id, tenant).await?;

        if let Some(worksite_id) = input.worksite_id {
            ensure_tenant_worksite(&*self.db, employee.tenant_id, worksite_id).await?;
        }

        let mut model: employee::ActiveModel = employee.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if input.clear_job_title {
            model.job_title = Set(None);
        } else if let Some(job_title) = input.job_title {
            model.job_title = Set(Some(job_title));
        }
        if let Some(worksite_id) = input.worksite_id {
            model.worksite_id = Set(Some(worksite_id));
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    /// Delete an employee. Active assignments hand their equipment back
    /// to the batch before the history is erased.
    #[instrument(skip(self))]
    pub async fn delete_employee(
        &self,
        employee_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let employee = find_scoped_employee(&txn, employee_id, tenant).await?;

        let assignments = Assignment::find()
            .filter(assignment::Column::EmployeeId.eq(employee_id))
            .all(&txn)
            .await?;

        for record in &assignments {
            if record.is_active() {
                let batch = InventoryBatch::find_by_id(record.batch_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Batch {} not found", record.batch_id))
                    })?;
                let restored = batch.available_quantity + 1;
                let mut model: inventory_batch::ActiveModel = batch.into();
                model.available_quantity = Set(restored);
                model.updated_at = Set(Utc::now());
                model.update(&txn).await?;
            }
        }

        Assignment::delete_many()
            .filter(assignment::Column::EmployeeId.eq(employee_id))
            .exec(&txn)
            .await?;

        let model: employee::ActiveModel = employee.into();
        model.delete(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::EmployeeDeleted(employee_id))
            .await;

        info!("Deleted employee: {}", employee_id);
        Ok(())
    }
}

async fn find_scoped_employee<C: ConnectionTrait>(
    conn: &C,
    employee_id: Uuid,
    tenant: Option<Uuid>,
) -> Result<EmployeeModel, ServiceError> {
    let employee = Employee::find_by_id(employee_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Employee {} not found", employee_id)))?;
    if let Some(tenant_id) = tenant {
        if employee.tenant_id != tenant_id {
            return Err(ServiceError::NotFound(format!(
                "Employee {} not found",
                employee_id
            )));
        }
    }
    Ok(employee)
}

async fn ensure_tenant_worksite<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    worksite_id: Uuid,
) -> Result<(), ServiceError> {
    let worksite = Worksite::find_by_id(worksite_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Worksite {} not found", worksite_id)))?;
    if worksite.tenant_id != tenant_id {
        return Err(ServiceError::NotFound(format!(
            "Worksite {} not found",
            worksite_id
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub job_title: Option<String>,
    pub worksite_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployeeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub job_title: Option<String>,
    #[serde(default)]
    pub clear_job_title: bool,
    pub worksite_id: Option<Uuid>,
}
