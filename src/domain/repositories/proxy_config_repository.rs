// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::proxy_config::ProxyConfig;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;

/// 代理配置仓库特质，只保存一行
#[async_trait]
pub trait ProxyConfigRepository: Send + Sync {
    /// 读取已保存的配置
    async fn load(&self) -> Result<Option<ProxyConfig>, RepositoryError>;
    /// 保存配置（插入或覆盖）
    async fn save(&self, config: &ProxyConfig) -> Result<(), RepositoryError>;
}
