use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 单行表，主键固定为 1
        manager
            .create_table(
                Table::create()
                    .table(ProxyConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProxyConfig::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProxyConfig::Enabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProxyConfig::ProxyUrl)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ProxyConfig::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProxyConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProxyConfig {
    Table,
    Id,
    Enabled,
    ProxyUrl,
    UpdatedAt,
}
