use sea_orm_migration::prelude::*;

use crate::m20260810_091500_settlements::Settlements;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Records {
    Table,
    Id,
    Date,
    Amount,
    Personnel,
    Departments,
    Description,
    CreatedBy,
    CreatedAt,
    IsSettled,
    SettlementId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Records::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Records::Date).string().not_null())
                    .col(ColumnDef::new(Records::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Records::Personnel).string().not_null())
                    .col(ColumnDef::new(Records::Departments).string().not_null())
                    .col(ColumnDef::new(Records::Description).string())
                    .col(ColumnDef::new(Records::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Records::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Records::IsSettled).boolean().not_null())
                    .col(ColumnDef::new(Records::SettlementId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-records-settlement_id")
                            .from(Records::Table, Records::SettlementId)
                            .to(Settlements::Table, Settlements::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-records-is_settled-created_at")
                    .table(Records::Table)
                    .col(Records::IsSettled)
                    .col(Records::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-records-settlement_id")
                    .table(Records::Table)
                    .col(Records::SettlementId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Records::Table).to_owned())
            .await
    }
}
