use sea_orm_migration::prelude::*;

use super::m20250901_000002_create_worksites_table::Worksites;
use super::m20250901_000003_create_catalog_tables::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryBatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryBatches::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryBatches::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(InventoryBatches::WorksiteId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryBatches::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryBatches::Color).string().not_null())
                    .col(ColumnDef::new(InventoryBatches::Size).string().not_null())
                    .col(
                        ColumnDef::new(InventoryBatches::BaseQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryBatches::AvailableQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryBatches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryBatches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_batches_worksite_id")
                            .from(InventoryBatches::Table, InventoryBatches::WorksiteId)
                            .to(Worksites::Table, Worksites::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_batches_product_id")
                            .from(InventoryBatches::Table, InventoryBatches::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_batches_tenant_id")
                    .table(InventoryBatches::Table)
                    .col(InventoryBatches::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_batches_product_id")
                    .table(InventoryBatches::Table)
                    .col(InventoryBatches::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryBatches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum InventoryBatches {
    Table,
    Id,
    TenantId,
    WorksiteId,
    ProductId,
    Color,
    Size,
    BaseQuantity,
    AvailableQuantity,
    CreatedAt,
    UpdatedAt,
}
