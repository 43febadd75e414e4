// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::scheduled_task_request::ScheduledTaskRequestDto;
use crate::domain::models::crawl_target::CrawlTarget;
use crate::domain::models::schedule::{Schedule, ScheduleError, ScheduleType};
use crate::domain::models::scheduled_task::ScheduledTask;
use crate::domain::models::task::{DomainError, Task};
use crate::domain::models::theme::ThemeCatalog;
use crate::queue::scheduler::{CrawlScheduler, ScheduledTaskDraft, SchedulerError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Error, Debug)]
pub enum ScheduledTaskUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// 定时任务管理用例
pub struct ScheduledTaskUseCase {
    catalog: Arc<ThemeCatalog>,
    scheduler: Arc<CrawlScheduler>,
}

impl ScheduledTaskUseCase {
    pub fn new(catalog: Arc<ThemeCatalog>, scheduler: Arc<CrawlScheduler>) -> Self {
        Self { catalog, scheduler }
    }

    pub async fn create(
        &self,
        dto: ScheduledTaskRequestDto,
    ) -> Result<ScheduledTask, ScheduledTaskUseCaseError> {
        let enabled = dto.enabled.unwrap_or(true);
        let draft = self.draft(dto)?;
        Ok(self.scheduler.create(draft, enabled).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: ScheduledTaskRequestDto,
    ) -> Result<ScheduledTask, ScheduledTaskUseCaseError> {
        let enabled = dto.enabled;
        let draft = self.draft(dto)?;
        Ok(self.scheduler.update(id, draft, enabled).await?)
    }

    pub async fn list(&self) -> Result<Vec<ScheduledTask>, ScheduledTaskUseCaseError> {
        Ok(self.scheduler.list().await?)
    }

    pub async fn set_enabled(
        &self,
        id: Uuid,
        enabled: bool,
    ) -> Result<ScheduledTask, ScheduledTaskUseCaseError> {
        Ok(self.scheduler.set_enabled(id, enabled).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ScheduledTaskUseCaseError> {
        Ok(self.scheduler.delete(id).await?)
    }

    pub async fn run_now(&self, id: Uuid) -> Result<Task, ScheduledTaskUseCaseError> {
        Ok(self.scheduler.run_now(id).await?)
    }

    /// 校验请求，并把 `schedule_value` 解析为调度规则
    fn draft(
        &self,
        dto: ScheduledTaskRequestDto,
    ) -> Result<ScheduledTaskDraft, ScheduledTaskUseCaseError> {
        dto.validate()
            .map_err(|e| ScheduledTaskUseCaseError::ValidationError(e.to_string()))?;

        let schedule_type: ScheduleType = dto.schedule_type.trim().parse()?;
        let schedule = Schedule::parse(schedule_type, &dto.schedule_value)?;
        let target = CrawlTarget::build(
            &self.catalog,
            &dto.theme_id,
            dto.mode,
            dto.start_page,
            dto.end_page,
        )?;

        Ok(ScheduledTaskDraft {
            name: dto.name.trim().to_string(),
            target,
            schedule,
        })
    }
}
