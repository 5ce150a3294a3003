//! Outbound notifications.
//!
//! Delivery is fire-and-forget over HTTP: failures are logged and never
//! propagate back into the request path or the event loop.

use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct NotificationService {
    client: Client,
    push_webhook_url: Option<String>,
    email_api_url: Option<String>,
    email_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct PushPayload {
    kind: &'static str,
    title: String,
    body: String,
    subject_id: Uuid,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            push_webhook_url: config.push_webhook_url.clone(),
            email_api_url: config.email_api_url.clone(),
            email_api_key: config.email_api_key.clone(),
        }
    }

    pub fn notify_order_created(&self, order_id: Uuid) {
        self.push(PushPayload {
            kind: "order_created",
            title: "Order received".to_string(),
            body: format!("Order {} has been received and is processing", order_id),
            subject_id: order_id,
        });
    }

    pub fn notify_order_status(&self, order_id: Uuid, new_status: &str) {
        self.push(PushPayload {
            kind: "order_status",
            title: "Order status changed".to_string(),
            body: format!("Order {} is now {}", order_id, new_status),
            subject_id: order_id,
        });
    }

    pub fn notify_low_stock(&self, batch_id: Uuid, product_id: Uuid, available: i32) {
        self.push(PushPayload {
            kind: "low_stock",
            title: "Low stock".to_string(),
            body: format!(
                "Batch {} of product {} is down to {} units",
                batch_id, product_id, available
            ),
            subject_id: batch_id,
        });
        self.email(
            "Low stock alert",
            format!(
                "Inventory batch {} (product {}) has {} units remaining.",
                batch_id, product_id, available
            ),
        );
    }

    pub fn notify_incident_submitted(&self, incident_id: Uuid) {
        self.push(PushPayload {
            kind: "incident_submitted",
            title: "Incident submitted".to_string(),
            body: format!("Incident {} is awaiting review", incident_id),
            subject_id: incident_id,
        });
        self.email(
            "Incident awaiting review",
            format!("Incident report {} has been submitted for review.", incident_id),
        );
    }

    fn push(&self, payload: PushPayload) {
        let Some(url) = self.push_webhook_url.clone() else {
            debug!(kind = payload.kind, "push webhook not configured, skipping");
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            let kind = payload.kind;
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(kind, "push notification delivered");
                }
                Ok(resp) => {
                    warn!(kind, status = %resp.status(), "push notification rejected");
                }
                Err(e) => {
                    warn!(kind, error = %e, "push notification failed");
                }
            }
        });
    }

    fn email(&self, subject: &str, body: String) {
        let Some(url) = self.email_api_url.clone() else {
            debug!("email API not configured, skipping");
            return;
        };
        let api_key = self.email_api_key.clone();
        let client = self.client.clone();
        let subject = subject.to_string();
        tokio::spawn(async move {
            let mut req = client
                .post(&url)
                .json(&json!({ "subject": subject, "body": body }));
            if let Some(key) = api_key {
                req = req.bearer_auth(key);
            }
            match req.send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(subject, "email notification delivered");
                }
                Ok(resp) => {
                    warn!(subject, status = %resp.status(), "email notification rejected");
                }
                Err(e) => {
                    warn!(subject, error = %e, "email notification failed");
                }
            }
        });
    }
}
