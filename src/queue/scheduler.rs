// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_target::CrawlTarget;
use crate::domain::models::schedule::Schedule;
use crate::domain::models::scheduled_task::ScheduledTask;
use crate::domain::models::task::{DomainError, Task};
use crate::domain::models::theme::ThemeCatalog;
use crate::domain::services::log_sink::{LogLevel, LogSink};
use crate::domain::services::proxy_config_store::ProxyConfigStore;
use crate::domain::services::task_store::{StoreError, TaskStore};
use crate::queue::task_queue::{QueueError, TaskQueue};
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 调度器错误类型
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// 定时任务的可编辑部分
#[derive(Debug, Clone)]
pub struct ScheduledTaskDraft {
    pub name: String,
    pub target: CrawlTarget,
    pub schedule: Schedule,
}

/// 一次 tick 的结果
#[derive(Debug, Default, Clone)]
pub struct TickReport {
    /// 本次派生的任务ID
    pub spawned: Vec<Uuid>,
    /// 因记录损坏或派生失败被跳过的定时任务ID
    pub skipped: Vec<Uuid>,
}

/// 定时任务调度器
///
/// 按固定间隔扫描定时任务，为到期的定义派生一个临时任务并入队，
/// 然后相对当前时间重新计算 `next_run`。从不等待爬取结束。
pub struct CrawlScheduler {
    store: Arc<TaskStore>,
    queue: Arc<dyn TaskQueue>,
    proxy_store: Arc<ProxyConfigStore>,
    catalog: Arc<ThemeCatalog>,
    log_sink: Arc<LogSink>,
    tick_interval: Duration,
    utc_offset: Option<FixedOffset>,
}

impl CrawlScheduler {
    /// 创建调度器
    ///
    /// # 参数
    ///
    /// * `tick_interval` - 扫描间隔
    /// * `utc_offset` - 计算每日/每周时间所用的时区，`None` 表示本机时区
    pub fn new(
        store: Arc<TaskStore>,
        queue: Arc<dyn TaskQueue>,
        proxy_store: Arc<ProxyConfigStore>,
        catalog: Arc<ThemeCatalog>,
        log_sink: Arc<LogSink>,
        tick_interval: Duration,
        utc_offset: Option<FixedOffset>,
    ) -> Self {
        Self {
            store,
            queue,
            proxy_store,
            catalog,
            log_sink,
            tick_interval,
            utc_offset,
        }
    }

    /// 调度所用时区下的当前时间
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }

    /// 启动调度器后台任务
    ///
    /// # 参数
    ///
    /// * `shutdown` - 关闭令牌，取消后循环退出
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let scheduler = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval(scheduler.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(
                tick_seconds = scheduler.tick_interval.as_secs(),
                "Scheduler started"
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let now = scheduler.now();
                match scheduler.tick(now).await {
                    Ok(report) => {
                        if !report.spawned.is_empty() {
                            info!("Scheduler spawned {} tasks", report.spawned.len());
                        }
                    }
                    Err(e) => error!("Scheduler tick failed: {}", e),
                }
            }

            info!("Scheduler stopped");
        })
    }

    /// 处理一次 tick
    ///
    /// 单个定义的失败只会被记录并跳过，不影响其余定义
    pub async fn tick(&self, now: DateTime<FixedOffset>) -> Result<TickReport, SchedulerError> {
        let ids = self.store.list_scheduled_ids().await?;
        let mut report = TickReport::default();

        for id in ids {
            match self.evaluate(id, now).await {
                Ok(Some(task_id)) => report.spawned.push(task_id),
                Ok(None) => {}
                Err(e) => {
                    self.log_sink.push(
                        LogLevel::Error,
                        &format!("定时任务 {} 执行失败: {}", id, e),
                    );
                    report.skipped.push(id);
                }
            }
        }

        debug!(
            spawned = report.spawned.len(),
            skipped = report.skipped.len(),
            "Scheduler tick finished"
        );
        Ok(report)
    }

    async fn evaluate(
        &self,
        id: Uuid,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<Uuid>, SchedulerError> {
        let definition = self.store.get_scheduled(id).await?;

        if !definition.enabled {
            return Ok(None);
        }

        if definition.next_run.is_none() {
            self.store
                .update_scheduled(id, move |t| {
                    t.reschedule_from(now);
                    Ok(())
                })
                .await?;
            return Ok(None);
        }

        if !definition.is_due(now) {
            return Ok(None);
        }

        let spawned = self.spawn(&definition).await;
        let recorded = spawned.is_ok();

        // 派生失败也推进 next_run，避免每个 tick 重复失败
        self.store
            .update_scheduled(id, move |t| {
                if recorded {
                    t.record_run(now);
                }
                t.reschedule_from(now);
                Ok(())
            })
            .await?;

        let task = spawned?;
        self.log_sink.push(
            LogLevel::Info,
            &format!("定时任务 {} 已触发，创建任务 {}", definition.name, task.id),
        );
        Ok(Some(task.id))
    }

    /// 按定义派生一个 Pending 任务，代理取自当前代理配置
    async fn spawn(&self, definition: &ScheduledTask) -> Result<Task, SchedulerError> {
        let target = definition.target();
        target.validate(&self.catalog)?;

        let task = Task::new(target, self.proxy_store.effective_proxy())
            .with_scheduled_task(definition.id);
        Ok(self.queue.enqueue(task).await?)
    }

    // ---- 定义管理 ----

    /// 创建定时任务，启用时按当前时间计算 `next_run`
    pub async fn create(
        &self,
        draft: ScheduledTaskDraft,
        enabled: bool,
    ) -> Result<ScheduledTask, SchedulerError> {
        draft.target.validate(&self.catalog)?;

        let mut definition =
            ScheduledTask::new(draft.name, draft.target, draft.schedule, enabled);
        definition.reschedule_from(self.now());

        let created = self.store.create_scheduled(definition).await?;
        info!(scheduled_task_id = %created.id, name = %created.name, "Scheduled task created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<ScheduledTask, SchedulerError> {
        Ok(self.store.get_scheduled(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<ScheduledTask>, SchedulerError> {
        Ok(self.store.list_scheduled().await?)
    }

    /// 编辑定义并重新计算 `next_run`
    pub async fn update(
        &self,
        id: Uuid,
        draft: ScheduledTaskDraft,
        enabled: Option<bool>,
    ) -> Result<ScheduledTask, SchedulerError> {
        draft.target.validate(&self.catalog)?;
        let now = self.now();

        let updated = self
            .store
            .update_scheduled(id, move |t| {
                t.apply_definition(draft.name, draft.target, draft.schedule);
                if let Some(enabled) = enabled {
                    t.enabled = enabled;
                }
                t.reschedule_from(now);
                Ok(())
            })
            .await?;
        info!(scheduled_task_id = %id, "Scheduled task updated");
        Ok(updated)
    }

    /// 启用时从当前时间重新计算，不补跑错过的时刻；禁用时清空 `next_run`
    pub async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<ScheduledTask, SchedulerError> {
        let now = self.now();
        let updated = self
            .store
            .update_scheduled(id, move |t| {
                t.enabled = enabled;
                t.reschedule_from(now);
                Ok(())
            })
            .await?;
        info!(scheduled_task_id = %id, enabled, "Scheduled task toggled");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), SchedulerError> {
        self.store.delete_scheduled(id).await?;
        info!(scheduled_task_id = %id, "Scheduled task deleted");
        Ok(())
    }

    /// 立即派生一次，`next_run` 保持不变
    pub async fn run_now(&self, id: Uuid) -> Result<Task, SchedulerError> {
        let definition = self.store.get_scheduled(id).await?;
        let task = self.spawn(&definition).await?;
        let now = self.now();

        if let Err(e) = self
            .store
            .update_scheduled(id, move |t| {
                t.record_run(now);
                Ok(())
            })
            .await
        {
            warn!(scheduled_task_id = %id, "Failed to record manual run: {}", e);
        }

        self.log_sink.push(
            LogLevel::Info,
            &format!("手动触发定时任务 {}，创建任务 {}", definition.name, task.id),
        );
        Ok(task)
    }
}
