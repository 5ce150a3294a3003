use crate::{
    entities::{
        lead_time_tier, price_tier,
        product::{self, ProductStatus},
        LeadTimeTier, PriceTier, Product, ProductModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::tiers::validate_tier_ranges,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Catalog service for managing products and their quantity-tier pricing.
///
/// Every product carries two independent tier tables: unit price by
/// quantity band and lead-time days by quantity band. Both are replaced
/// wholesale, never edited row by row, so a tier set is always
/// internally consistent.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a product together with its initial tier tables.
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductDetail, ServiceError> {
        validate_tier_ranges(
            &input
                .price_tiers
                .iter()
                .map(|t| (t.min_quantity, t.max_quantity))
                .collect::<Vec<_>>(),
        )?;
        validate_tier_ranges(
            &input
                .lead_time_tiers
                .iter()
                .map(|t| (t.min_quantity, t.max_quantity))
                .collect::<Vec<_>>(),
        )?;

        let txn = self.db.begin().await?;

        let existing = Product::find()
            .filter(product::Column::Sku.eq(input.sku.clone()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SKU {} already exists",
                input.sku
            )));
        }

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let model = product::ActiveModel {
            id: Set(product_id),
            sku: Set(input.sku),
            name: Set(input.name),
            description: Set(input.description),
            category: Set(input.category),
            brand: Set(input.brand),
            use_life_months: Set(input.use_life_months),
            status: Set(input.status.unwrap_or(ProductStatus::Draft)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&txn).await?;

        let price_tiers = insert_price_tiers(&txn, product_id, &input.price_tiers).await?;
        let lead_time_tiers =
            insert_lead_time_tiers(&txn, product_id, &input.lead_time_tiers).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        Ok(ProductDetail {
            product: created,
            price_tiers,
            lead_time_tiers,
        })
    }

    /// Fetch a product with both tier tables.
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let price_tiers = PriceTier::find()
            .filter(price_tier::Column::ProductId.eq(product_id))
            .order_by_asc(price_tier::Column::MinQuantity)
            .all(&*self.db)
            .await?;
        let lead_time_tiers = LeadTimeTier::find()
            .filter(lead_time_tier::Column::ProductId.eq(product_id))
            .order_by_asc(lead_time_tier::Column::MinQuantity)
            .all(&*self.db)
            .await?;

        Ok(ProductDetail {
            product,
            price_tiers,
            lead_time_tiers,
        })
    }

    /// List products. Contractors browse active products only; the status
    /// filter widens the view for back-office roles.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ProductModel>, u64), ServiceError> {
        let mut query = Product::find();

        match filter.status {
            Some(status) => query = query.filter(product::Column::Status.eq(status)),
            None => query = query.filter(product::Column::Status.eq(ProductStatus::Active)),
        }
        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(brand) = filter.brand {
            query = query.filter(product::Column::Brand.eq(brand));
        }
        if let Some(search) = filter.search {
            query = query.filter(product::Column::Name.contains(&search));
        }

        let paginator = query
            .order_by_asc(product::Column::Name)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((products, total))
    }

    /// Update product fields. Tier tables are replaced through their own
    /// operations.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let mut model: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(description) = input.description {
            model.description = Set(description);
        }
        if let Some(category) = input.category {
            model.category = Set(category);
        }
        if let Some(brand) = input.brand {
            model.brand = Set(brand);
        }
        if let Some(months) = input.use_life_months {
            model.use_life_months = Set(months);
        }
        if let Some(status) = input.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        Ok(updated)
    }

    /// Replace the price tier table for a product.
    #[instrument(skip(self))]
    pub async fn replace_price_tiers(
        &self,
        product_id: Uuid,
        tiers: Vec<PriceTierInput>,
    ) -> Result<Vec<price_tier::Model>, ServiceError> {
        validate_tier_ranges(
            &tiers
                .iter()
                .map(|t| (t.min_quantity, t.max_quantity))
                .collect::<Vec<_>>(),
        )?;

        let txn = self.db.begin().await?;

        ensure_product_exists(&txn, product_id).await?;

        PriceTier::delete_many()
            .filter(price_tier::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        let inserted = insert_price_tiers(&txn, product_id, &tiers).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        Ok(inserted)
    }

    /// Replace the lead-time tier table for a product.
    #[instrument(skip(self))]
    pub async fn replace_lead_time_tiers(
        &self,
        product_id: Uuid,
        tiers: Vec<LeadTimeTierInput>,
    ) -> Result<Vec<lead_time_tier::Model>, ServiceError> {
        validate_tier_ranges(
            &tiers
                .iter()
                .map(|t| (t.min_quantity, t.max_quantity))
                .collect::<Vec<_>>(),
        )?;

        let txn = self.db.begin().await?;

        ensure_product_exists(&txn, product_id).await?;

        LeadTimeTier::delete_many()
            .filter(lead_time_tier::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        let inserted = insert_lead_time_tiers(&txn, product_id, &tiers).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        Ok(inserted)
    }

    /// Archive a product so it disappears from the catalog. Existing
    /// orders and assignments keep their snapshots.
    #[instrument(skip(self))]
    pub async fn archive_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let mut model: product::ActiveModel = product.into();
        model.status = Set(ProductStatus::Archived);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductArchived(product_id))
            .await;

        Ok(updated)
    }
}

async fn ensure_product_exists<C: sea_orm::ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<(), ServiceError> {
    Product::find_by_id(product_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
}

async fn insert_price_tiers<C: sea_orm::ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    tiers: &[PriceTierInput],
) -> Result<Vec<price_tier::Model>, ServiceError> {
    let mut inserted = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let model = price_tier::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            min_quantity: Set(tier.min_quantity),
            max_quantity: Set(tier.max_quantity),
            unit_price: Set(tier.unit_price),
        };
        inserted.push(model.insert(conn).await?);
    }
    Ok(inserted)
}

async fn insert_lead_time_tiers<C: sea_orm::ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    tiers: &[LeadTimeTierInput],
) -> Result<Vec<lead_time_tier::Model>, ServiceError> {
    let mut inserted = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let model = lead_time_tier::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            min_quantity: Set(tier.min_quantity),
            max_quantity: Set(tier.max_quantity),
            days: Set(tier.days),
        };
        inserted.push(model.insert(conn).await?);
    }
    Ok(inserted)
}

/// A product with both tier tables attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductModel,
    pub price_tiers: Vec<price_tier::Model>,
    pub lead_time_tiers: Vec<lead_time_tier::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PriceTierInput {
    #[validate(range(min = 1))]
    pub min_quantity: i32,
    #[validate(range(min = 1))]
    pub max_quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LeadTimeTierInput {
    #[validate(range(min = 1))]
    pub min_quantity: i32,
    #[validate(range(min = 1))]
    pub max_quantity: i32,
    #[validate(range(min = 0))]
    pub days: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub brand: String,
    #[validate(range(min = 0))]
    pub use_life_months: i32,
    pub status: Option<ProductStatus>,
    #[validate(length(min = 1))]
    pub price_tiers: Vec<PriceTierInput>,
    #[validate(length(min = 1))]
    pub lead_time_tiers: Vec<LeadTimeTierInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,
    #[validate(range(min = 0))]
    pub use_life_months: Option<i32>,
    pub status: Option<ProductStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
}
