//! SafeGear API Library
//!
//! Core functionality for the SafeGear PPE ordering and safety
//! management backend: tiered catalog, carts and checkout, warehouse
//! inventory, equipment assignment with use-life tracking, and the
//! incident reporting workflow.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod rate_limiter;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::permissions as perm;
use crate::auth::AuthRouterExt;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
    pub auth: Arc<auth::AuthService>,
}

/// Builds the versioned API router. Route groups are gated by the
/// permission they require; auth endpoints are mounted separately with
/// the [`auth::AuthService`] as their state.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    // Catalog
    let catalog = handlers::products::catalog_routes().with_permission(perm::CATALOG_READ);
    let catalog_admin =
        handlers::products::catalog_admin_routes().with_permission(perm::CATALOG_MANAGE);

    // Cart
    let cart = handlers::carts::carts_routes().with_permission(perm::CARTS_MANAGE);

    // Orders
    let orders_read = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/:id", get(handlers::orders::get_order))
        .with_permission(perm::ORDERS_READ);
    let orders_create = Router::new()
        .route("/orders/checkout", post(handlers::orders::checkout))
        .with_permission(perm::ORDERS_CREATE);
    let orders_admin =
        handlers::orders::orders_admin_routes().with_permission(perm::ORDERS_UPDATE_STATUS);

    // Inventory
    let inventory = handlers::inventory::inventory_routes().with_permission(perm::INVENTORY_READ);
    let inventory_receive = Router::new()
        .route(
            "/warehouse/inventory/receive",
            post(handlers::inventory::receive_batch),
        )
        .with_permission(perm::INVENTORY_RECEIVE);
    let inventory_adjust = Router::new()
        .route(
            "/warehouse/inventory/:id/adjust",
            put(handlers::inventory::adjust_batch),
        )
        .with_permission(perm::INVENTORY_ADJUST);

    // Equipment
    let equipment_read = Router::new()
        .route(
            "/equipment/employees/:employee_id/equipment",
            get(handlers::equipment::employee_equipment),
        )
        .with_permission(perm::EQUIPMENT_READ);
    let equipment_assign = Router::new()
        .route(
            "/equipment/employees/:employee_id/assignments",
            post(handlers::equipment::assign),
        )
        .route(
            "/equipment/assignments/:assignment_id/return",
            post(handlers::equipment::unassign),
        )
        .with_permission(perm::EQUIPMENT_ASSIGN);

    // Employees
    let employees_read = Router::new()
        .route("/employees", get(handlers::employees::list_employees))
        .route("/employees/:id", get(handlers::employees::get_employee))
        .with_permission(perm::EMPLOYEES_READ);
    let employees_manage = Router::new()
        .route("/employees", post(handlers::employees::create_employee))
        .route(
            "/employees/:id",
            put(handlers::employees::update_employee)
                .delete(handlers::employees::delete_employee),
        )
        .with_permission(perm::EMPLOYEES_MANAGE);

    // Worksites
    let worksites_read = Router::new()
        .route("/worksites", get(handlers::worksites::list_worksites))
        .route("/worksites/:id", get(handlers::worksites::get_worksite))
        .with_permission(perm::WORKSITES_READ);
    let worksites_manage = Router::new()
        .route("/worksites", post(handlers::worksites::create_worksite))
        .route(
            "/worksites/:id",
            put(handlers::worksites::update_worksite)
                .delete(handlers::worksites::delete_worksite),
        )
        .with_permission(perm::WORKSITES_MANAGE);

    // Incidents
    let incidents_read = Router::new()
        .route("/incidents", get(handlers::incidents::list_incidents))
        .route("/incidents/:id", get(handlers::incidents::get_incident))
        .with_permission(perm::INCIDENTS_READ);
    let incidents_report = Router::new()
        .route("/incidents", post(handlers::incidents::create_incident))
        .route(
            "/incidents/:id",
            put(handlers::incidents::update_incident),
        )
        .route(
            "/incidents/:id/steps",
            put(handlers::incidents::upsert_step),
        )
        .route(
            "/incidents/:id/submit",
            post(handlers::incidents::submit_incident),
        )
        .with_permission(perm::INCIDENTS_REPORT);
    let incidents_review =
        handlers::incidents::incidents_review_routes().with_permission(perm::INCIDENTS_REVIEW);

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/products", catalog)
        .nest("/admin/products", catalog_admin)
        .nest("/cart", cart)
        .merge(orders_read)
        .merge(orders_create)
        .nest("/admin/orders", orders_admin)
        .nest("/inventory", inventory)
        .merge(inventory_receive)
        .merge(inventory_adjust)
        .merge(equipment_read)
        .merge(equipment_assign)
        .merge(employees_read)
        .merge(employees_manage)
        .merge(worksites_read)
        .merge(worksites_manage)
        .merge(incidents_read)
        .merge(incidents_report)
        .nest("/admin/incidents", incidents_review)
}

async fn api_status() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    Json(json!({
        "status": "ok",
        "service": "safegear-api",
        "version": version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
