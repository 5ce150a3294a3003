use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Worksites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Worksites::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Worksites::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Worksites::Name).string().not_null())
                    .col(ColumnDef::new(Worksites::Address).string().null())
                    .col(
                        ColumnDef::new(Worksites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_worksites_tenant_id")
                    .table(Worksites::Table)
                    .col(Worksites::TenantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Worksites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Worksites {
    Table,
    Id,
    TenantId,
    Name,
    Address,
    CreatedAt,
}
