use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 日志按行追加，任务行本身不随日志增长
        manager
            .create_table(
                Table::create()
                    .table(TaskLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TaskLogs::TaskId).uuid().not_null())
                    .col(ColumnDef::new(TaskLogs::Seq).integer().not_null())
                    .col(ColumnDef::new(TaskLogs::Line).text().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_task_logs")
                            .col(TaskLogs::TaskId)
                            .col(TaskLogs::Seq),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TaskLogs {
    Table,
    TaskId,
    Seq,
    Line,
}
