pub mod carts;
pub mod common;
pub mod employees;
pub mod equipment;
pub mod incidents;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod worksites;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::CatalogService>,
    pub cart: Arc<crate::services::CartService>,
    pub order: Arc<crate::services::OrderService>,
    pub inventory: Arc<crate::services::InventoryService>,
    pub equipment: Arc<crate::services::EquipmentService>,
    pub employee: Arc<crate::services::EmployeeService>,
    pub incident: Arc<crate::services::IncidentService>,
    pub worksite: Arc<crate::services::WorksiteService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        Self {
            catalog: Arc::new(crate::services::CatalogService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            cart: Arc::new(crate::services::CartService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            order: Arc::new(crate::services::OrderService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            inventory: Arc::new(crate::services::InventoryService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.low_stock_threshold,
            )),
            equipment: Arc::new(crate::services::EquipmentService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            employee: Arc::new(crate::services::EmployeeService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            incident: Arc::new(crate::services::IncidentService::new(
                db_pool.clone(),
                event_sender,
            )),
            worksite: Arc::new(crate::services::WorksiteService::new(db_pool)),
        }
    }
}
