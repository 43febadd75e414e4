// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::schedule::{Schedule, ScheduleType};
use crate::domain::models::scheduled_task::ScheduledTask;
use crate::domain::repositories::scheduled_task_repository::ScheduledTaskRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::scheduled_task as scheduled_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 定时任务仓库实现
///
/// 读取时把 `schedule_type`/`schedule_value` 解析为 [`Schedule`]，
/// 解析失败的行作为损坏记录处理
#[derive(Clone)]
pub struct ScheduledTaskRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ScheduledTaskRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<scheduled_entity::Model> for ScheduledTask {
    type Error = RepositoryError;

    fn try_from(model: scheduled_entity::Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let corrupted = |reason: String| RepositoryError::Corrupted { id, reason };

        let schedule_type: ScheduleType = model
            .schedule_type
            .parse()
            .map_err(|e| corrupted(format!("{}", e)))?;
        let schedule = Schedule::parse(schedule_type, &model.schedule_value)
            .map_err(|e| corrupted(format!("{}", e)))?;
        let mode = model.mode.parse().map_err(|e| corrupted(format!("{}", e)))?;

        Ok(Self {
            id,
            name: model.name,
            theme_id: model.theme_id,
            mode,
            start_page: model.start_page,
            end_page: model.end_page,
            schedule,
            enabled: model.enabled,
            last_run: model.last_run,
            next_run: model.next_run,
            run_count: model.run_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&ScheduledTask> for scheduled_entity::ActiveModel {
    fn from(task: &ScheduledTask) -> Self {
        Self {
            id: Set(task.id),
            name: Set(task.name.clone()),
            theme_id: Set(task.theme_id.clone()),
            mode: Set(task.mode.to_string()),
            start_page: Set(task.start_page),
            end_page: Set(task.end_page),
            schedule_type: Set(task.schedule.schedule_type().to_string()),
            schedule_value: Set(task.schedule.value()),
            enabled: Set(task.enabled),
            last_run: Set(task.last_run),
            next_run: Set(task.next_run),
            run_count: Set(task.run_count),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl ScheduledTaskRepository for ScheduledTaskRepositoryImpl {
    async fn insert(&self, task: &ScheduledTask) -> Result<(), RepositoryError> {
        let model: scheduled_entity::ActiveModel = task.into();
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledTask>, RepositoryError> {
        scheduled_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(ScheduledTask::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<ScheduledTask>, RepositoryError> {
        let models = scheduled_entity::Entity::find()
            .order_by_asc(scheduled_entity::Column::CreatedAt)
            .order_by_asc(scheduled_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let mut tasks = Vec::with_capacity(models.len());
        for model in models {
            match ScheduledTask::try_from(model) {
                Ok(task) => tasks.push(task),
                Err(e) => warn!("Skipping unreadable scheduled task: {}", e),
            }
        }
        Ok(tasks)
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>, RepositoryError> {
        let ids = scheduled_entity::Entity::find()
            .select_only()
            .column(scheduled_entity::Column::Id)
            .order_by_asc(scheduled_entity::Column::CreatedAt)
            .order_by_asc(scheduled_entity::Column::Id)
            .into_tuple::<Uuid>()
            .all(self.db.as_ref())
            .await?;
        Ok(ids)
    }

    async fn save(&self, task: &ScheduledTask) -> Result<(), RepositoryError> {
        let model: scheduled_entity::ActiveModel = task.into();
        let result = scheduled_entity::Entity::update_many()
            .set(model)
            .filter(scheduled_entity::Column::Id.eq(task.id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = scheduled_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }
}
