use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::Sku)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).text().not_null())
                    .col(ColumnDef::new(Products::Category).string().not_null())
                    .col(ColumnDef::new(Products::Brand).string().not_null())
                    .col(ColumnDef::new(Products::UseLifeMonths).integer().not_null())
                    .col(ColumnDef::new(Products::Status).string().not_null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PriceTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceTiers::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PriceTiers::ProductId).uuid().not_null())
                    .col(ColumnDef::new(PriceTiers::MinQuantity).integer().not_null())
                    .col(ColumnDef::new(PriceTiers::MaxQuantity).integer().not_null())
                    .col(
                        ColumnDef::new(PriceTiers::UnitPrice)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_tiers_product_id")
                            .from(PriceTiers::Table, PriceTiers::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_price_tiers_product_id")
                    .table(PriceTiers::Table)
                    .col(PriceTiers::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadTimeTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadTimeTiers::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeadTimeTiers::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(LeadTimeTiers::MinQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeadTimeTiers::MaxQuantity)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeadTimeTiers::Days).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_time_tiers_product_id")
                            .from(LeadTimeTiers::Table, LeadTimeTiers::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_time_tiers_product_id")
                    .table(LeadTimeTiers::Table)
                    .col(LeadTimeTiers::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeadTimeTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PriceTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Sku,
    Name,
    Description,
    Category,
    Brand,
    UseLifeMonths,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum PriceTiers {
    Table,
    Id,
    ProductId,
    MinQuantity,
    MaxQuantity,
    UnitPrice,
}

#[derive(DeriveIden)]
pub enum LeadTimeTiers {
    Table,
    Id,
    ProductId,
    MinQuantity,
    MaxQuantity,
    Days,
}
