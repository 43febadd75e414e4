// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, TaskStatus};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 持久化数据无法还原为领域对象
    #[error("Corrupted record {id}: {reason}")]
    Corrupted { id: Uuid, reason: String },
}

/// 任务仓库特质
///
/// 定义临时爬取任务的数据访问接口。任务行与日志行分开存放，
/// 日志只追加，写入任务状态时不会重写历史日志。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 插入新任务及其已有日志
    async fn insert(&self, task: &Task) -> Result<(), RepositoryError>;
    /// 根据ID查找任务，包含完整日志
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;
    /// 根据ID读取任务行，`logs` 为空
    async fn find_record(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;
    /// 按创建顺序列出全部任务，包含完整日志
    async fn list(&self) -> Result<Vec<Task>, RepositoryError>;
    /// 按创建顺序列出指定状态的任务ID
    async fn find_ids_by_status(&self, status: TaskStatus) -> Result<Vec<Uuid>, RepositoryError>;
    /// 在同一事务内覆盖任务行并追加日志行，`task.logs` 不参与写入
    ///
    /// 记录不存在时返回 `NotFound`
    async fn save(&self, task: &Task, appended_logs: &[String]) -> Result<(), RepositoryError>;
    /// 删除任务及其日志，返回是否确有记录被删除
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
