// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 键不合法（包含路径穿越等）
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 任务结果文件的存储键
pub fn result_key(task_id: Uuid) -> String {
    format!("results/{}.txt", task_id)
}

/// 结果文件存储特质
///
/// 以字符串键存取任务产出的磁力链接文件
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 使用指定键保存数据，已存在时覆盖
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 根据键读取数据，不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// 删除数据，键不存在时视为成功
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
