use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use strum::Display;

/// Order created from a cart at checkout. Contractor and delivery-address
/// details are embedded as an immutable JSON snapshot rather than
/// normalized, so later profile edits never rewrite order history.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "orders")]
#[schema(as = Order)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub status: OrderStatus,
    #[sea_orm(column_type = "Json")]
    pub contractor_snapshot: Json,
    pub total: Decimal,
    /// Latest delivery date promised from the lead-time tiers at checkout
    pub promised_by: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Order status lifecycle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Display, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "returned")]
    Returned,
    #[sea_orm(string_value = "complaint")]
    Complaint,
}

impl OrderStatus {
    /// Valid forward transitions. Cancellation is only possible before the
    /// order ships; returns and complaints only after delivery.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Delivered, Returned)
                | (Delivered, Complaint)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Returned | OrderStatus::Complaint
        )
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;

    #[test]
    fn processing_can_ship_or_cancel() {
        assert!(Processing.can_transition_to(Shipped));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(Delivered));
        assert!(!Processing.can_transition_to(Returned));
    }

    #[test]
    fn returns_and_complaints_require_delivery() {
        assert!(Delivered.can_transition_to(Returned));
        assert!(Delivered.can_transition_to(Complaint));
        assert!(!Shipped.can_transition_to(Returned));
        assert!(!Processing.can_transition_to(Complaint));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for terminal in [Cancelled, Returned, Complaint] {
            assert!(terminal.is_terminal());
            for next in [Processing, Shipped, Delivered, Cancelled, Returned, Complaint] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
