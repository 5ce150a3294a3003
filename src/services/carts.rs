use crate::{
    entities::{
        cart_item, price_tier, product::ProductStatus, CartItem, CartItemModel, PriceTier, Product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::tiers::resolve_unit_price,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Cart service.
///
/// Each tenant has one implicit cart, its lines keyed by product, color
/// and size. The unit price on a line is captured from the quantity tiers
/// at the moment the line is created or its quantity changes, and is
/// deliberately left stale when an admin edits the tiers afterwards. The
/// explicit `refresh_prices` operation re-captures every line.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Add a product variant to the cart, merging with an existing line
    /// for the same product/color/size. On merge the price is re-resolved
    /// for the combined quantity.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        tenant_id: Uuid,
        input: AddCartItemInput,
    ) -> Result<CartItemModel, ServiceError> {
        let txn = self.db.begin().await?;

        let product = Product::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;
        if product.status != ProductStatus::Active {
            return Err(ServiceError::InvalidOperation(format!(
                "Product {} is not available for ordering",
                input.product_id
            )));
        }

        let tiers = load_price_tiers(&txn, input.product_id).await?;

        let existing = CartItem::find()
            .filter(cart_item::Column::TenantId.eq(tenant_id))
            .filter(cart_item::Column::ProductId.eq(input.product_id))
            .filter(cart_item::Column::Color.eq(input.color.clone()))
            .filter(cart_item::Column::Size.eq(input.size.clone()))
            .one(&txn)
            .await?;

        let now = Utc::now();
        let item = if let Some(item) = existing {
            let combined = item.quantity + input.quantity;
            let unit_price = resolve_unit_price(&tiers, combined)?;
            let mut model: cart_item::ActiveModel = item.into();
            model.quantity = Set(combined);
            model.unit_price = Set(unit_price);
            model.updated_at = Set(now);
            model.update(&txn).await?
        } else {
            let unit_price = resolve_unit_price(&tiers, input.quantity)?;
            let model = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                product_id: Set(input.product_id),
                color: Set(input.color),
                size: Set(input.size),
                quantity: Set(input.quantity),
                unit_price: Set(unit_price),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model.insert(&txn).await?
        };

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                tenant_id,
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .await;

        Ok(item)
    }

    /// Change a line's quantity. Zero removes the line; any other value
    /// re-captures the unit price for the new quantity.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemModel>, ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity must not be negative, got {}",
                quantity
            )));
        }

        let txn = self.db.begin().await?;

        let item = find_tenant_item(&txn, tenant_id, item_id).await?;

        if quantity == 0 {
            item.delete(&txn).await?;
            txn.commit().await?;
            self.event_sender
                .send_or_log(Event::CartItemRemoved { tenant_id, item_id })
                .await;
            return Ok(None);
        }

        let tiers = load_price_tiers(&txn, item.product_id).await?;
        let unit_price = resolve_unit_price(&tiers, quantity)?;

        let mut model: cart_item::ActiveModel = item.into();
        model.quantity = Set(quantity);
        model.unit_price = Set(unit_price);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, tenant_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let item = find_tenant_item(&*self.db, tenant_id, item_id).await?;
        item.delete(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::CartItemRemoved { tenant_id, item_id })
            .await;
        Ok(())
    }

    /// The cart with per-line and whole-cart totals, computed from the
    /// captured prices.
    #[instrument(skip(self))]
    pub async fn list_cart(&self, tenant_id: Uuid) -> Result<CartView, ServiceError> {
        let items = CartItem::find()
            .filter(cart_item::Column::TenantId.eq(tenant_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let lines: Vec<CartLine> = items
            .into_iter()
            .map(|item| {
                let line_total = item.unit_price * Decimal::from(item.quantity);
                CartLine { item, line_total }
            })
            .collect();
        let total = lines.iter().map(|l| l.line_total).sum();

        Ok(CartView { lines, total })
    }

    /// Re-capture every line's unit price from the current tiers. Lines
    /// whose quantity no longer fits any tier are reported, not silently
    /// dropped.
    #[instrument(skip(self))]
    pub async fn refresh_prices(&self, tenant_id: Uuid) -> Result<CartView, ServiceError> {
        let txn = self.db.begin().await?;

        let items = CartItem::find()
            .filter(cart_item::Column::TenantId.eq(tenant_id))
            .all(&txn)
            .await?;

        let mut updated_lines = 0usize;
        for item in items {
            let tiers = load_price_tiers(&txn, item.product_id).await?;
            let unit_price = resolve_unit_price(&tiers, item.quantity)?;
            if unit_price != item.unit_price {
                let mut model: cart_item::ActiveModel = item.into();
                model.unit_price = Set(unit_price);
                model.updated_at = Set(Utc::now());
                model.update(&txn).await?;
                updated_lines += 1;
            }
        }

        txn.commit().await?;

        info!(tenant_id = %tenant_id, updated_lines, "cart prices refreshed");
        self.event_sender
            .send_or_log(Event::CartPricesRefreshed {
                tenant_id,
                updated_lines,
            })
            .await;

        self.list_cart(tenant_id).await
    }

    /// Remove every line from the tenant's cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, tenant_id: Uuid) -> Result<(), ServiceError> {
        CartItem::delete_many()
            .filter(cart_item::Column::TenantId.eq(tenant_id))
            .exec(&*self.db)
            .await?;
        self.event_sender
            .send_or_log(Event::CartCleared(tenant_id))
            .await;
        Ok(())
    }
}

async fn find_tenant_item<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    item_id: Uuid,
) -> Result<CartItemModel, ServiceError> {
    let item = CartItem::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;
    if item.tenant_id != tenant_id {
        return Err(ServiceError::NotFound(format!(
            "Cart item {} not found",
            item_id
        )));
    }
    Ok(item)
}

pub(crate) async fn load_price_tiers<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Vec<price_tier::Model>, ServiceError> {
    Ok(PriceTier::find()
        .filter(price_tier::Column::ProductId.eq(product_id))
        .order_by_asc(price_tier::Column::MinQuantity)
        .all(conn)
        .await?)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddCartItemInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
    #[validate(length(min = 1, max = 50))]
    pub size: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// A cart line with its computed total.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItemModel,
    pub line_total: Decimal,
}

/// The whole cart as presented to the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
}
