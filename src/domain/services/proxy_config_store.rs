// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::proxy_config::ProxyConfig;
use crate::domain::repositories::proxy_config_repository::ProxyConfigRepository;
use crate::domain::services::task_store::StoreError;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// 代理配置存储
///
/// 读取走内存缓存；写入先校验、再落盘，成功后才替换缓存
pub struct ProxyConfigStore {
    repo: Arc<dyn ProxyConfigRepository>,
    current: RwLock<ProxyConfig>,
    write_lock: Mutex<()>,
}

impl ProxyConfigStore {
    /// 从仓库加载配置，没有记录时使用禁用的空配置
    pub async fn load(repo: Arc<dyn ProxyConfigRepository>) -> Result<Self, StoreError> {
        let current = repo.load().await?.unwrap_or_default();
        Ok(Self {
            repo,
            current: RwLock::new(current),
            write_lock: Mutex::new(()),
        })
    }

    pub fn get(&self) -> ProxyConfig {
        self.current.read().clone()
    }

    /// 当前生效的代理地址
    pub fn effective_proxy(&self) -> Option<String> {
        self.current.read().effective_proxy()
    }

    /// 更新配置
    ///
    /// # 参数
    ///
    /// * `enabled` - 是否启用
    /// * `proxy_url` - 代理地址；启用时必须合法，禁用时原样保存
    ///
    /// # 返回值
    ///
    /// * `Ok(ProxyConfig)` - 已持久化的新配置
    /// * `Err(StoreError::Domain)` - 地址不合法，原配置不变
    pub async fn set(&self, enabled: bool, proxy_url: &str) -> Result<ProxyConfig, StoreError> {
        let config = ProxyConfig::new(enabled, proxy_url)?;

        let _guard = self.write_lock.lock().await;
        self.repo.save(&config).await?;
        *self.current.write() = config.clone();

        info!(
            enabled = config.enabled,
            proxy_url = %config.proxy_url,
            "Proxy configuration updated"
        );
        Ok(config)
    }
}
