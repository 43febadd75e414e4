// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scheduled_task::ScheduledTask;
use crate::domain::models::task::{DomainError, Task, TaskStatus};
use crate::domain::repositories::scheduled_task_repository::ScheduledTaskRepository;
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::domain::services::execution_registry::ExecutionRegistry;
use crate::domain::services::log_sink::{format_log_line, LogLevel};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 任务存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    /// 记录不存在
    #[error("Task {0} not found")]
    NotFound(Uuid),
    /// 运行中的任务未在宽限期内确认取消
    #[error("Task {0} is busy and did not stop in time")]
    Busy(Uuid),
    /// 领域规则拒绝
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// 持久化失败
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// 结果文件存储失败
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 任务存储
///
/// 临时任务与定时任务的唯一持久化入口。所有读-改-写都在同一把写锁内
/// 串行完成，并作为单行写入落盘；读者只会看到完整记录。
pub struct TaskStore {
    tasks: Arc<dyn TaskRepository>,
    scheduled: Arc<dyn ScheduledTaskRepository>,
    storage: Arc<dyn StorageRepository>,
    registry: Arc<ExecutionRegistry>,
    write_lock: Mutex<()>,
    cancel_grace: Duration,
}

impl TaskStore {
    /// 创建任务存储
    ///
    /// # 参数
    ///
    /// * `tasks` - 临时任务仓库
    /// * `scheduled` - 定时任务仓库
    /// * `storage` - 结果文件存储
    /// * `registry` - 执行登记表，删除运行中任务时用于取消
    /// * `cancel_grace` - 等待执行器确认取消的最长时间
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        scheduled: Arc<dyn ScheduledTaskRepository>,
        storage: Arc<dyn StorageRepository>,
        registry: Arc<ExecutionRegistry>,
        cancel_grace: Duration,
    ) -> Self {
        Self {
            tasks,
            scheduled,
            storage,
            registry,
            write_lock: Mutex::new(()),
            cancel_grace,
        }
    }

    pub fn storage(&self) -> Arc<dyn StorageRepository> {
        self.storage.clone()
    }

    pub fn registry(&self) -> Arc<ExecutionRegistry> {
        self.registry.clone()
    }

    // ---- 临时任务 ----

    pub async fn create_task(&self, task: Task) -> Result<Task, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.tasks.insert(&task).await?;
        debug!(task_id = %task.id, "Task created");
        Ok(task)
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task, StoreError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    /// 按创建顺序列出任务
    pub async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.list().await?)
    }

    /// 在写锁内对任务执行读-改-写
    ///
    /// 处于终态的任务不允许再改变状态。修改函数看到的 `logs` 为空，
    /// 其中追加的行会接在已有日志之后写入，历史日志不会被重写。
    ///
    /// # 参数
    ///
    /// * `id` - 任务ID
    /// * `mutator` - 修改函数，返回错误时不写入
    ///
    /// # 返回值
    ///
    /// * `Ok(Task)` - 写入后的任务，`logs` 只包含本次追加的行
    /// * `Err(StoreError)` - 任务不存在、修改被拒绝或持久化失败
    pub async fn update_task<F>(&self, id: Uuid, mutator: F) -> Result<Task, StoreError>
    where
        F: FnOnce(&mut Task) -> Result<(), DomainError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut task = self
            .tasks
            .find_record(id)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        let before = task.status;

        mutator(&mut task)?;

        if before.is_terminal() && task.status != before {
            return Err(DomainError::InvalidStateTransition {
                from: before,
                to: task.status,
            }
            .into());
        }

        let appended = std::mem::take(&mut task.logs);
        match self.tasks.save(&task, &appended).await {
            Ok(()) => {
                task.logs = appended;
                Ok(task)
            }
            Err(RepositoryError::NotFound) => Err(StoreError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// 追加一行任务日志
    pub async fn append_log(&self, id: Uuid, line: String) -> Result<(), StoreError> {
        self.update_task(id, move |t| {
            t.push_log(line);
            Ok(())
        })
        .await?;
        Ok(())
    }

    /// 删除任务及其结果文件
    ///
    /// 运行中的任务先请求取消，并在宽限期内等待执行器确认退出，
    /// 超时返回 `Busy` 且记录保持不变。
    pub async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        loop {
            let task = self
                .tasks
                .find_record(id)
                .await?
                .ok_or(StoreError::NotFound(id))?;

            if task.status == TaskStatus::Running {
                if let Some(finished) = self.registry.cancel(id) {
                    info!(task_id = %id, "Cancelling running task before removal");
                    tokio::time::timeout(self.cancel_grace, finished.cancelled())
                        .await
                        .map_err(|_| StoreError::Busy(id))?;
                }
            }

            let _guard = self.write_lock.lock().await;
            let current = match self.tasks.find_record(id).await? {
                Some(current) => current,
                None => return Err(StoreError::NotFound(id)),
            };

            // 等待期间 Pending 任务可能刚被执行槽位启动，重新走取消流程
            if current.status == TaskStatus::Running && self.registry.is_active(id) {
                continue;
            }

            // 已登记但尚未切换为 Running 的执行会在启动时发现记录不存在
            self.registry.cancel(id);
            self.tasks.delete(id).await?;
            if let Some(path) = current.result_path.as_deref() {
                if let Err(e) = self.storage.delete(path).await {
                    warn!(task_id = %id, "Failed to remove result file {}: {}", path, e);
                }
            }
            info!(task_id = %id, "Task deleted");
            return Ok(());
        }
    }

    /// 启动恢复
    ///
    /// 上一个进程遗留的 Running 任务标记为失败，返回按创建顺序排列的 Pending 任务ID
    pub async fn recover_interrupted(&self) -> Result<Vec<Uuid>, StoreError> {
        let running = self.tasks.find_ids_by_status(TaskStatus::Running).await?;
        for task_id in running {
            let line = format_log_line(LogLevel::Error, "task interrupted by process restart");
            self.update_task(task_id, move |t| {
                t.push_log(line);
                t.fail("interrupted")
            })
            .await?;
            warn!(task_id = %task_id, "Marked interrupted task as failed");
        }

        Ok(self.tasks.find_ids_by_status(TaskStatus::Pending).await?)
    }

    // ---- 定时任务 ----

    pub async fn create_scheduled(&self, task: ScheduledTask) -> Result<ScheduledTask, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.scheduled.insert(&task).await?;
        Ok(task)
    }

    pub async fn get_scheduled(&self, id: Uuid) -> Result<ScheduledTask, StoreError> {
        self.scheduled
            .find_by_id(id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn list_scheduled(&self) -> Result<Vec<ScheduledTask>, StoreError> {
        Ok(self.scheduled.list().await?)
    }

    /// 全部定时任务ID，包括无法解析的记录
    pub async fn list_scheduled_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        Ok(self.scheduled.list_ids().await?)
    }

    pub async fn update_scheduled<F>(&self, id: Uuid, mutator: F) -> Result<ScheduledTask, StoreError>
    where
        F: FnOnce(&mut ScheduledTask) -> Result<(), DomainError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut task = self.get_scheduled(id).await?;
        mutator(&mut task)?;

        match self.scheduled.save(&task).await {
            Ok(()) => Ok(task),
            Err(RepositoryError::NotFound) => Err(StoreError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_scheduled(&self, id: Uuid) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.scheduled.delete(id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}
