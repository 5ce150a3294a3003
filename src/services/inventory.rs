use crate::{
    entities::{
        inventory_batch,
        product::{self, ProductStatus},
        InventoryBatch, InventoryBatchModel, Product, Worksite,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Inventory service for warehouse stock batches.
///
/// A batch records a quantity of one product variant (color/size) received
/// for a tenant at a worksite. `base_quantity` is fixed at receipt;
/// `available_quantity` moves as equipment is assigned, returned or
/// manually adjusted, and always stays within `0..=base_quantity`.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    low_stock_threshold: i32,
}

impl InventoryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        low_stock_threshold: i32,
    ) -> Self {
        Self {
            db,
            event_sender,
            low_stock_threshold,
        }
    }

    /// Receive stock into a new batch. The received quantity becomes both
    /// the base and the available quantity.
    #[instrument(skip(self))]
    pub async fn receive_batch(
        &self,
        input: ReceiveBatchInput,
    ) -> Result<InventoryBatchModel, ServiceError> {
        let product = Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;
        if product.status == ProductStatus::Archived {
            return Err(ServiceError::InvalidOperation(format!(
                "Product {} is archived",
                input.product_id
            )));
        }

        Worksite::find_by_id(input.worksite_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Worksite {} not found", input.worksite_id))
            })?;

        let now = Utc::now();
        let batch = inventory_batch::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            worksite_id: Set(input.worksite_id),
            product_id: Set(input.product_id),
            color: Set(input.color),
            size: Set(input.size),
            base_quantity: Set(input.quantity),
            available_quantity: Set(input.quantity),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let batch = batch.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::BatchReceived {
                batch_id: batch.id,
                product_id: batch.product_id,
                quantity: batch.base_quantity,
            })
            .await;

        info!("Received batch: {}", batch.id);
        Ok(batch)
    }

    /// List batches, optionally narrowed to a tenant, worksite or product.
    #[instrument(skip(self))]
    pub async fn list_batches(
        &self,
        tenant: Option<Uuid>,
        filter: BatchFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<InventoryBatchModel>, u64), ServiceError> {
        let mut query = InventoryBatch::find();
        if let Some(tenant_id) = tenant {
            query = query.filter(inventory_batch::Column::TenantId.eq(tenant_id));
        }
        if let Some(worksite_id) = filter.worksite_id {
            query = query.filter(inventory_batch::Column::WorksiteId.eq(worksite_id));
        }
        if let Some(product_id) = filter.product_id {
            query = query.filter(inventory_batch::Column::ProductId.eq(product_id));
        }

        let paginator = query
            .order_by_desc(inventory_batch::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let batches = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((batches, total))
    }

    #[instrument(skip(self))]
    pub async fn get_batch(
        &self,
        batch_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<InventoryBatchModel, ServiceError> {
        let batch = InventoryBatch::find_by_id(batch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch {} not found", batch_id)))?;

        if let Some(tenant_id) = tenant {
            if batch.tenant_id != tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Batch {} not found",
                    batch_id
                )));
            }
        }

        Ok(batch)
    }

    /// Manually correct a batch's available quantity. The new value must
    /// stay within the batch's base quantity, and the reason is kept in
    /// the log trail.
    #[instrument(skip(self))]
    pub async fn adjust_batch(
        &self,
        batch_id: Uuid,
        input: AdjustBatchInput,
    ) -> Result<InventoryBatchModel, ServiceError> {
        let batch = InventoryBatch::find_by_id(batch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch {} not found", batch_id)))?;

        if input.available_quantity < 0 || input.available_quantity > batch.base_quantity {
            return Err(ServiceError::ValidationError(format!(
                "Available quantity must be within 0..={}, got {}",
                batch.base_quantity, input.available_quantity
            )));
        }

        let old_quantity = batch.available_quantity;
        let mut model: inventory_batch::ActiveModel = batch.into();
        model.available_quantity = Set(input.available_quantity);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&*self.db).await?;

        info!(
            batch_id = %batch_id,
            old_quantity,
            new_quantity = updated.available_quantity,
            reason = %input.reason,
            "inventory adjusted"
        );

        self.event_sender
            .send_or_log(Event::InventoryAdjusted {
                batch_id,
                old_quantity,
                new_quantity: updated.available_quantity,
                reason: input.reason,
            })
            .await;

        if updated.available_quantity < self.low_stock_threshold {
            warn!(batch_id = %batch_id, available = updated.available_quantity, "low stock");
            self.event_sender
                .send_or_log(Event::LowStockDetected {
                    batch_id,
                    product_id: updated.product_id,
                    available_quantity: updated.available_quantity,
                })
                .await;
        }

        Ok(updated)
    }

    /// Batches whose available quantity sits below the configured low
    /// stock threshold.
    #[instrument(skip(self))]
    pub async fn low_stock(
        &self,
        tenant: Option<Uuid>,
    ) -> Result<Vec<InventoryBatchModel>, ServiceError> {
        let mut query = InventoryBatch::find()
            .filter(inventory_batch::Column::AvailableQuantity.lt(self.low_stock_threshold));
        if let Some(tenant_id) = tenant {
            query = query.filter(inventory_batch::Column::TenantId.eq(tenant_id));
        }
        let batches = query
            .order_by_asc(inventory_batch::Column::AvailableQuantity)
            .all(&*self.db)
            .await?;
        Ok(batches)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReceiveBatchInput {
    pub tenant_id: Uuid,
    pub worksite_id: Uuid,
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
    #[validate(length(min = 1, max = 50))]
    pub size: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BatchFilter {
    pub worksite_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdjustBatchInput {
    pub available_quantity: i32,
    #[validate(length(min = 1, max = 255))]
    pub reason: String,
}
