use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduledTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduledTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduledTasks::Name).string().not_null())
                    .col(ColumnDef::new(ScheduledTasks::ThemeId).string().not_null())
                    .col(ColumnDef::new(ScheduledTasks::Mode).string().not_null())
                    .col(ColumnDef::new(ScheduledTasks::StartPage).integer().not_null())
                    .col(ColumnDef::new(ScheduledTasks::EndPage).integer().not_null())
                    .col(ColumnDef::new(ScheduledTasks::ScheduleType).string().not_null())
                    .col(ColumnDef::new(ScheduledTasks::ScheduleValue).string().not_null())
                    .col(
                        ColumnDef::new(ScheduledTasks::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ScheduledTasks::LastRun).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScheduledTasks::NextRun).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScheduledTasks::RunCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScheduledTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduledTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScheduledTasks {
    Table,
    Id,
    Name,
    ThemeId,
    Mode,
    StartPage,
    EndPage,
    ScheduleType,
    ScheduleValue,
    Enabled,
    LastRun,
    NextRun,
    RunCount,
    CreatedAt,
    UpdatedAt,
}
