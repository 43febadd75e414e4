// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scheduled_task::ScheduledTask;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 定时任务仓库特质
#[async_trait]
pub trait ScheduledTaskRepository: Send + Sync {
    /// 插入新定义
    async fn insert(&self, task: &ScheduledTask) -> Result<(), RepositoryError>;
    /// 根据ID查找，规则无法解析时返回 `Corrupted`
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledTask>, RepositoryError>;
    /// 按创建顺序列出可解析的定义，损坏的行被跳过
    async fn list(&self) -> Result<Vec<ScheduledTask>, RepositoryError>;
    /// 按创建顺序列出全部ID，包括损坏的行
    async fn list_ids(&self) -> Result<Vec<Uuid>, RepositoryError>;
    /// 覆盖保存
    async fn save(&self, task: &ScheduledTask) -> Result<(), RepositoryError>;
    /// 删除，返回是否确有记录被删除
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
