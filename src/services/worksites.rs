use crate::{
    entities::{employee, inventory_batch, worksite, Employee, InventoryBatch, Worksite, WorksiteModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Worksite roster service. Worksites anchor inventory batches and
/// employees to a physical location within a tenant.
#[derive(Clone)]
pub struct WorksiteService {
    db: Arc<DatabaseConnection>,
}

impl WorksiteService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_worksite(
        &self,
        tenant_id: Uuid,
        input: CreateWorksiteInput,
    ) -> Result<WorksiteModel, ServiceError> {
        let model = worksite::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(input.name),
            address: Set(input.address),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_worksites(
        &self,
        tenant: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<WorksiteModel>, u64), ServiceError> {
        let mut query = Worksite::find();
        if let Some(tenant_id) = tenant {
            query = query.filter(worksite::Column::TenantId.eq(tenant_id));
        }

        let paginator = query
            .order_by_asc(worksite::Column::Name)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let worksites = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((worksites, total))
    }

    #[instrument(skip(self))]
    pub async fn get_worksite(
        &self,
        worksite_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<WorksiteModel, ServiceError> {
        self.find_scoped(worksite_id, tenant).await
    }

    #[instrument(skip(self))]
    pub async fn update_worksite(
        &self,
        worksite_id: Uuid,
        tenant: Option<Uuid>,
        input: UpdateWorksiteInput,
    ) -> Result<WorksiteModel, ServiceError> {
        let worksite = self.find_scoped(worksite_id, tenant).await?;

        let mut model: worksite::ActiveModel = worksite.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(address) = input.address {
            model.address = Set(Some(address));
        }
        Ok(model.update(&*self.db).await?)
    }

    /// Delete an empty worksite. Sites still holding stock or staff are
    /// refused.
    #[instrument(skip(self))]
    pub async fn delete_worksite(
        &self,
        worksite_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let worksite = self.find_scoped(worksite_id, tenant).await?;

        let batches = InventoryBatch::find()
            .filter(inventory_batch::Column::WorksiteId.eq(worksite_id))
            .count(&*self.db)
            .await?;
        if batches > 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Worksite {} still has inventory batches",
                worksite_id
            )));
        }

        let employees = Employee::find()
            .filter(employee::Column::WorksiteId.eq(worksite_id))
            .count(&*self.db)
            .await?;
        if employees > 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Worksite {} still has employees",
                worksite_id
            )));
        }

        worksite.delete(&*self.db).await?;
        Ok(())
    }

    async fn find_scoped(
        &self,
        worksite_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<WorksiteModel, ServiceError> {
        let worksite = Worksite::find_by_id(worksite_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Worksite {} not found", worksite_id))
            })?;
        if let Some(tenant_id) = tenant {
            if worksite.tenant_id != tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Worksite {} not found",
                    worksite_id
                )));
            }
        }
        Ok(worksite)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateWorksiteInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWorksiteInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
}
