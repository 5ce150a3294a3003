pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users_table;
mod m20250901_000002_create_worksites_table;
mod m20250901_000003_create_catalog_tables;
mod m20250901_000004_create_inventory_batches_table;
mod m20250901_000005_create_cart_items_table;
mod m20250901_000006_create_orders_tables;
mod m20250901_000007_create_employees_tables;
mod m20250901_000008_create_incident_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_table::Migration),
            Box::new(m20250901_000002_create_worksites_table::Migration),
            Box::new(m20250901_000003_create_catalog_tables::Migration),
            Box::new(m20250901_000004_create_inventory_batches_table::Migration),
            Box::new(m20250901_000005_create_cart_items_table::Migration),
            Box::new(m20250901_000006_create_orders_tables::Migration),
            Box::new(m20250901_000007_create_employees_tables::Migration),
            Box::new(m20250901_000008_create_incident_tables::Migration),
        ]
    }
}
