use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CrawlTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CrawlTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CrawlTasks::ThemeId).string().not_null())
                    .col(ColumnDef::new(CrawlTasks::Mode).string().not_null())
                    .col(ColumnDef::new(CrawlTasks::StartPage).integer().not_null())
                    .col(ColumnDef::new(CrawlTasks::EndPage).integer().not_null())
                    .col(ColumnDef::new(CrawlTasks::Proxy).string())
                    .col(ColumnDef::new(CrawlTasks::Status).string().not_null())
                    .col(ColumnDef::new(CrawlTasks::Progress).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlTasks::TotalLinks).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlTasks::FoundLinks).integer().not_null().default(0))
                    .col(ColumnDef::new(CrawlTasks::ErrorMessage).text())
                    .col(ColumnDef::new(CrawlTasks::ResultPath).string())
                    .col(ColumnDef::new(CrawlTasks::ScheduledTaskId).uuid())
                    .col(
                        ColumnDef::new(CrawlTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CrawlTasks::StartTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(CrawlTasks::EndTime).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CrawlTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_crawl_tasks_status_created")
                    .table(CrawlTasks::Table)
                    .col(CrawlTasks::Status)
                    .col(CrawlTasks::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CrawlTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CrawlTasks {
    Table,
    Id,
    ThemeId,
    Mode,
    StartPage,
    EndPage,
    Proxy,
    Status,
    Progress,
    TotalLinks,
    FoundLinks,
    ErrorMessage,
    ResultPath,
    ScheduledTaskId,
    CreatedAt,
    StartTime,
    EndTime,
    UpdatedAt,
}
