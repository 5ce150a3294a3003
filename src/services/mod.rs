//! Business logic services.
//!
//! Each service owns one resource family, holds a shared database
//! connection and the event sender, and exposes the operations the
//! handlers call. Multi-step mutations run inside SeaORM transactions.

pub mod carts;
pub mod catalog;
pub mod employees;
pub mod equipment;
pub mod incidents;
pub mod inventory;
pub mod lifecycle;
pub mod notifications;
pub mod orders;
pub mod tiers;
pub mod worksites;

pub use carts::CartService;
pub use catalog::CatalogService;
pub use employees::EmployeeService;
pub use equipment::EquipmentService;
pub use incidents::IncidentService;
pub use inventory::InventoryService;
pub use notifications::NotificationService;
pub use orders::OrderService;
pub use worksites::WorksiteService;
