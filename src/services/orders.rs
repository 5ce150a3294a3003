use crate::{
    entities::{
        lead_time_tier,
        order::{self, OrderStatus},
        order_item, cart_item, CartItem, LeadTimeTier, Order, OrderItem, OrderItemModel,
        OrderModel, Product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::tiers::resolve_lead_time_days,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
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

/// Order service.
///
/// Checkout turns the tenant's cart into an order in one transaction:
/// the contractor and delivery details are frozen into a JSON snapshot,
/// lines are copied at their captured prices, and the promise date is
/// derived from the slowest lead-time tier across the lines.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Convert the tenant's cart into an order.
    #[instrument(skip(self))]
    pub async fn checkout(
        &self,
        tenant_id: Uuid,
        input: CheckoutInput,
    ) -> Result<OrderDetail, ServiceError> {
        let txn = self.db.begin().await?;

        let cart_items = CartItem::find()
            .filter(cart_item::Column::TenantId.eq(tenant_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&txn)
            .await?;
        if cart_items.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Cart is empty".to_string(),
            ));
        }

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let mut total = Decimal::ZERO;
        let mut max_lead_days: i32 = 0;
        let mut items = Vec::with_capacity(cart_items.len());

        for line in &cart_items {
            let product = Product::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", line.product_id))
                })?;

            let lead_tiers = LeadTimeTier::find()
                .filter(lead_time_tier::Column::ProductId.eq(line.product_id))
                .order_by_asc(lead_time_tier::Column::MinQuantity)
                .all(&txn)
                .await?;
            let lead_days = resolve_lead_time_days(&lead_tiers, line.quantity)?;
            max_lead_days = max_lead_days.max(lead_days);

            let line_total = line.unit_price * Decimal::from(line.quantity);
            total += line_total;

            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                product_name: Set(product.name),
                color: Set(line.color.clone()),
                size: Set(line.size.clone()),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                line_total: Set(line_total),
            };
            items.push(item.insert(&txn).await?);
        }

        let snapshot = serde_json::to_value(&input.contractor).map_err(|e| {
            ServiceError::InternalError(format!("Failed to serialize order snapshot: {}", e))
        })?;

        let order = order::ActiveModel {
            id: Set(order_id),
            tenant_id: Set(tenant_id),
            order_number: Set(generate_order_number()),
            status: Set(OrderStatus::Processing),
            contractor_snapshot: Set(snapshot),
            total: Set(total),
            promised_by: Set(Some(now + Duration::days(i64::from(max_lead_days)))),
            created_at: Set(now),
            updated_at: Set(None),
        };
        let order = order.insert(&txn).await?;

        CartItem::delete_many()
            .filter(cart_item::Column::TenantId.eq(tenant_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order_id))
            .await;

        info!(order_id = %order_id, order_number = %order.order_number, "order created");
        Ok(OrderDetail { order, items })
    }

    /// List orders, newest first. Contractors see their tenant only.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        tenant: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let mut query = Order::find();
        if let Some(tenant_id) = tenant {
            query = query.filter(order::Column::TenantId.eq(tenant_id));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((orders, total))
    }

    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        order_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<OrderDetail, ServiceError> {
        let order = self.find_scoped(order_id, tenant).await?;
        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;
        Ok(OrderDetail { order, items })
    }

    /// Move an order along its status lifecycle. Invalid transitions are
    /// rejected with the allowed successors in the message.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let order = self.find_scoped(order_id, None).await?;

        let old_status = order.status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Order {} cannot move from {} to {}",
                order_id, old_status, new_status
            )));
        }

        let mut model: order::ActiveModel = order.into();
        model.status = Set(new_status);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;

        Ok(updated)
    }

    async fn find_scoped(
        &self,
        order_id: Uuid,
        tenant: Option<Uuid>,
    ) -> Result<OrderModel, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        if let Some(tenant_id) = tenant {
            if order.tenant_id != tenant_id {
                return Err(ServiceError::NotFound(format!(
                    "Order {} not found",
                    order_id
                )));
            }
        }
        Ok(order)
    }
}

fn generate_order_number() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("SG-{}", suffix)
}

/// Frozen contractor and delivery details stored on the order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContractorSnapshot {
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate]
    pub delivery_address: DeliveryAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeliveryAddress {
    #[validate(length(min = 1, max = 255))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutInput {
    #[validate]
    pub contractor: ContractorSnapshot,
}

/// An order with its line items.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_are_prefixed_and_distinct() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(a.starts_with("SG-"));
        assert_eq!(a.len(), 11);
        assert_ne!(a, b);
    }
}
