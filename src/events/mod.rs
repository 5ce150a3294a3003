use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::services::notifications::NotificationService;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is
    /// closed or full. Event delivery is best-effort and never blocks a
    /// request from committing.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

// The events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductArchived(Uuid),

    // Cart events
    CartItemAdded {
        tenant_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    },
    CartItemRemoved {
        tenant_id: Uuid,
        item_id: Uuid,
    },
    CartPricesRefreshed {
        tenant_id: Uuid,
        updated_lines: usize,
    },
    CartCleared(Uuid),

    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Inventory events
    BatchReceived {
        batch_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    },
    InventoryAdjusted {
        batch_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
        reason: String,
    },
    LowStockDetected {
        batch_id: Uuid,
        product_id: Uuid,
        available_quantity: i32,
    },

    // Equipment lifecycle events
    EquipmentAssigned {
        employee_id: Uuid,
        batch_ids: Vec<Uuid>,
    },
    EquipmentReturned {
        employee_id: Uuid,
        assignment_id: Uuid,
    },

    // Employee events
    EmployeeCreated(Uuid),
    EmployeeDeleted(Uuid),

    // EHS incident events
    IncidentReported(Uuid),
    IncidentSubmitted(Uuid),
    IncidentStatusChanged {
        incident_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Drains the event channel, logging everything and pushing the events
// that warrant a human notification through the notification service.
pub async fn process_events(
    mut rx: mpsc::Receiver<Event>,
    notifications: Option<Arc<NotificationService>>,
) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "order created");
                if let Some(n) = &notifications {
                    n.notify_order_created(*order_id);
                }
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    order_id = %order_id,
                    old_status, new_status,
                    "order status changed"
                );
                if let Some(n) = &notifications {
                    n.notify_order_status(*order_id, new_status);
                }
            }
            Event::LowStockDetected {
                batch_id,
                product_id,
                available_quantity,
            } => {
                warn!(
                    batch_id = %batch_id,
                    product_id = %product_id,
                    available_quantity,
                    "low stock detected"
                );
                if let Some(n) = &notifications {
                    n.notify_low_stock(*batch_id, *product_id, *available_quantity);
                }
            }
            Event::IncidentSubmitted(incident_id) => {
                info!(incident_id = %incident_id, "incident submitted for review");
                if let Some(n) = &notifications {
                    n.notify_incident_submitted(*incident_id);
                }
            }
            Event::EquipmentAssigned {
                employee_id,
                batch_ids,
            } => {
                info!(
                    employee_id = %employee_id,
                    count = batch_ids.len(),
                    "equipment assigned"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();
        sender.send(Event::OrderCreated(id)).await.unwrap();
        assert!(matches!(rx.recv().await, Some(Event::OrderCreated(got)) if got == id));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or return an error to the caller
        sender.send_or_log(Event::CartCleared(Uuid::new_v4())).await;
    }

    #[test]
    fn generic_event_carries_message() {
        let event = Event::with_data("hello".to_string());
        match event {
            Event::Generic { message, .. } => assert_eq!(message, "hello"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
