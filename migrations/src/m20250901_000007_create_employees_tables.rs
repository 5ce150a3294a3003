use sea_orm_migration::prelude::*;

use super::m20250901_000002_create_worksites_table::Worksites;
use super::m20250901_000004_create_inventory_batches_table::InventoryBatches;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Employees::WorksiteId).uuid().null())
                    .col(ColumnDef::new(Employees::Name).string().not_null())
                    .col(ColumnDef::new(Employees::JobTitle).string().null())
                    .col(
                        ColumnDef::new(Employees::AssignedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_worksite_id")
                            .from(Employees::Table, Employees::WorksiteId)
                            .to(Worksites::Table, Worksites::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_tenant_id")
                    .table(Employees::Table)
                    .col(Employees::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::BatchId).uuid().not_null())
                    .col(ColumnDef::new(Assignments::EmployeeId).uuid().not_null())
                    .col(
                        ColumnDef::new(Assignments::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::UnassignedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_batch_id")
                            .from(Assignments::Table, Assignments::BatchId)
                            .to(InventoryBatches::Table, InventoryBatches::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignments_employee_id")
                            .from(Assignments::Table, Assignments::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_employee_id")
                    .table(Assignments::Table)
                    .col(Assignments::EmployeeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Employees {
    Table,
    Id,
    TenantId,
    WorksiteId,
    Name,
    JobTitle,
    AssignedCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Assignments {
    Table,
    Id,
    BatchId,
    EmployeeId,
    AssignedAt,
    UnassignedAt,
}
