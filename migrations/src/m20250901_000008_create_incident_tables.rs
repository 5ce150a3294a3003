use sea_orm_migration::prelude::*;

use super::m20250901_000002_create_worksites_table::Worksites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IncidentReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncidentReports::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncidentReports::TenantId).uuid().not_null())
                    .col(ColumnDef::new(IncidentReports::WorksiteId).uuid().null())
                    .col(
                        ColumnDef::new(IncidentReports::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncidentReports::Severity).string().not_null())
                    .col(ColumnDef::new(IncidentReports::Description).text().not_null())
                    .col(ColumnDef::new(IncidentReports::Status).string().not_null())
                    .col(ColumnDef::new(IncidentReports::ReportedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(IncidentReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncidentReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_reports_worksite_id")
                            .from(IncidentReports::Table, IncidentReports::WorksiteId)
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
                    .name("idx_incident_reports_tenant_id")
                    .table(IncidentReports::Table)
                    .col(IncidentReports::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IncidentSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncidentSteps::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncidentSteps::IncidentId).uuid().not_null())
                    .col(
                        ColumnDef::new(IncidentSteps::StepNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncidentSteps::Payload).json().not_null())
                    .col(
                        ColumnDef::new(IncidentSteps::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(IncidentSteps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncidentSteps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_steps_incident_id")
                            .from(IncidentSteps::Table, IncidentSteps::IncidentId)
                            .to(IncidentReports::Table, IncidentReports::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per workflow step per incident
        manager
            .create_index(
                Index::create()
                    .name("idx_incident_steps_incident_step")
                    .table(IncidentSteps::Table)
                    .col(IncidentSteps::IncidentId)
                    .col(IncidentSteps::StepNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IncidentSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncidentReports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum IncidentReports {
    Table,
    Id,
    TenantId,
    WorksiteId,
    OccurredAt,
    Severity,
    Description,
    Status,
    ReportedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum IncidentSteps {
    Table,
    Id,
    IncidentId,
    StepNumber,
    Payload,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}
