// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::task::{Task, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::crawl_task as task_entity;
use crate::infrastructure::database::entities::task_log as log_entity;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的 `crawl_tasks` 与 `task_logs` 表访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_logs(&self, task_id: Uuid) -> Result<Vec<String>, RepositoryError> {
        Ok(log_entity::Entity::find()
            .filter(log_entity::Column::TaskId.eq(task_id))
            .order_by_asc(log_entity::Column::Seq)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|row| row.line)
            .collect())
    }
}

/// 在任务已有日志之后追加若干行
async fn append_logs<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    lines: &[String],
) -> Result<(), DbErr> {
    if lines.is_empty() {
        return Ok(());
    }

    let last_seq: Option<Option<i32>> = log_entity::Entity::find()
        .select_only()
        .column_as(Expr::col(log_entity::Column::Seq).max(), "last_seq")
        .filter(log_entity::Column::TaskId.eq(task_id))
        .into_tuple()
        .one(db)
        .await?;
    let first = last_seq.flatten().map_or(0, |seq| seq + 1);

    let rows = lines
        .iter()
        .enumerate()
        .map(|(offset, line)| log_entity::ActiveModel {
            task_id: Set(task_id),
            seq: Set(first + offset as i32),
            line: Set(line.clone()),
        });
    log_entity::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

impl TryFrom<task_entity::Model> for Task {
    type Error = RepositoryError;

    fn try_from(model: task_entity::Model) -> Result<Self, Self::Error> {
        let corrupted = |reason: String| RepositoryError::Corrupted {
            id: model.id,
            reason,
        };
        let mode = model.mode.parse().map_err(|e| corrupted(format!("{}", e)))?;
        let status = model
            .status
            .parse()
            .map_err(|e| corrupted(format!("{}", e)))?;

        Ok(Self {
            id: model.id,
            theme_id: model.theme_id,
            mode,
            start_page: model.start_page,
            end_page: model.end_page,
            proxy: model.proxy,
            status,
            progress: model.progress,
            total_links: model.total_links,
            found_links: model.found_links,
            error_message: model.error_message,
            logs: Vec::new(),
            result_path: model.result_path,
            scheduled_task_id: model.scheduled_task_id,
            created_at: model.created_at,
            start_time: model.start_time,
            end_time: model.end_time,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Task> for task_entity::ActiveModel {
    fn from(task: &Task) -> Self {
        Self {
            id: Set(task.id),
            theme_id: Set(task.theme_id.clone()),
            mode: Set(task.mode.to_string()),
            start_page: Set(task.start_page),
            end_page: Set(task.end_page),
            proxy: Set(task.proxy.clone()),
            status: Set(task.status.to_string()),
            progress: Set(task.progress),
            total_links: Set(task.total_links),
            found_links: Set(task.found_links),
            error_message: Set(task.error_message.clone()),
            result_path: Set(task.result_path.clone()),
            scheduled_task_id: Set(task.scheduled_task_id),
            created_at: Set(task.created_at),
            start_time: Set(task.start_time),
            end_time: Set(task.end_time),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn insert(&self, task: &Task) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let model: task_entity::ActiveModel = task.into();
        model.insert(&txn).await?;
        append_logs(&txn, task.id, &task.logs).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let Some(mut task) = self.find_record(id).await? else {
            return Ok(None);
        };
        task.logs = self.load_logs(id).await?;
        Ok(Some(task))
    }

    async fn find_record(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Task>, RepositoryError> {
        let mut tasks = task_entity::Entity::find()
            .order_by_asc(task_entity::Column::CreatedAt)
            .order_by_asc(task_entity::Column::Id)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut logs: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in log_entity::Entity::find()
            .order_by_asc(log_entity::Column::TaskId)
            .order_by_asc(log_entity::Column::Seq)
            .all(self.db.as_ref())
            .await?
        {
            logs.entry(row.task_id).or_default().push(row.line);
        }

        for task in &mut tasks {
            task.logs = logs.remove(&task.id).unwrap_or_default();
        }
        Ok(tasks)
    }

    async fn find_ids_by_status(&self, status: TaskStatus) -> Result<Vec<Uuid>, RepositoryError> {
        Ok(task_entity::Entity::find()
            .select_only()
            .column(task_entity::Column::Id)
            .filter(task_entity::Column::Status.eq(status.to_string()))
            .order_by_asc(task_entity::Column::CreatedAt)
            .order_by_asc(task_entity::Column::Id)
            .into_tuple()
            .all(self.db.as_ref())
            .await?)
    }

    async fn save(&self, task: &Task, appended_logs: &[String]) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;
        let model: task_entity::ActiveModel = task.into();
        let result = task_entity::Entity::update_many()
            .set(model)
            .filter(task_entity::Column::Id.eq(task.id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        append_logs(&txn, task.id, appended_logs).await?;
        txn.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let txn = self.db.begin().await?;
        log_entity::Entity::delete_many()
            .filter(log_entity::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        let result = task_entity::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}
